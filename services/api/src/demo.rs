use crate::infra::{
    load_engine, parse_target, InMemoryAuditLog, InMemoryReportRepository,
};
use clap::Args;
use itiva::assessment::{AnswerSet, AssessmentReport, Category, ScoringEngine, TargetScores};
use itiva::config::AssessmentConfig;
use itiva::error::AppError;
use itiva::reports::{ReportService, UserId};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON object mapping question ids to zero-based option positions
    pub(crate) answers: PathBuf,
    /// Questionnaire JSON or CSV to score against (defaults to the embedded catalog)
    #[arg(long)]
    pub(crate) questionnaire: Option<PathBuf>,
    /// Print the report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct SynthesizeArgs {
    /// Target Website Strength score (0-100)
    #[arg(long, value_parser = parse_target)]
    pub(crate) ws: i32,
    /// Target Devices & Network score (0-100)
    #[arg(long, value_parser = parse_target)]
    pub(crate) dn: i32,
    /// Target Compliance Documentation score (0-100)
    #[arg(long, value_parser = parse_target)]
    pub(crate) cd: i32,
    /// Target Cyber Security Implementations score (0-100)
    #[arg(long, value_parser = parse_target)]
    pub(crate) cs: i32,
    /// Questionnaire JSON or CSV (defaults to the embedded catalog)
    #[arg(long)]
    pub(crate) questionnaire: Option<PathBuf>,
    /// Print answers and report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// User id the sample reports are stored under
    #[arg(long, default_value = "demo-user")]
    pub(crate) user: String,
    /// Questionnaire JSON or CSV (defaults to the embedded catalog)
    #[arg(long)]
    pub(crate) questionnaire: Option<PathBuf>,
}

fn engine_for(questionnaire: Option<PathBuf>) -> Result<ScoringEngine, AppError> {
    let config = AssessmentConfig {
        questionnaire_path: questionnaire,
    };
    Ok(load_engine(&config)?)
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let engine = engine_for(args.questionnaire)?;
    let file = File::open(&args.answers)?;
    let answers: AnswerSet = serde_json::from_reader(BufReader::new(file))?;

    let report = engine.score(&answers)?;
    if args.json {
        println!("{}", to_json(&report)?);
    } else {
        println!(
            "Scored {} of {} questions",
            answers.len(),
            engine.catalog().len()
        );
        render_report(&report);
    }
    Ok(())
}

pub(crate) fn run_synthesize(args: SynthesizeArgs) -> Result<(), AppError> {
    let engine = engine_for(args.questionnaire)?;
    let targets = TargetScores::new(args.ws, args.dn, args.cd, args.cs);

    let synthesis = engine.synthesize(&targets)?;
    if args.json {
        println!("{}", to_json(&synthesis)?);
        return Ok(());
    }

    println!("Synthesized answers");
    for category in Category::ordered() {
        println!(
            "- {}: target {} -> {}",
            category.label(),
            targets.get(category),
            synthesis.report.scores.get(category)
        );
    }
    for question in engine.catalog().questions() {
        let Some(option) = synthesis
            .answers
            .get(question.id)
            .and_then(|index| question.option(index))
        else {
            continue;
        };
        if !option.score.is_best() {
            println!("  Q{} [{}] {}", question.id, option.score.value(), option.text);
        }
    }
    render_report(&synthesis.report);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let engine = Arc::new(engine_for(args.questionnaire)?);
    let audit = Arc::new(InMemoryAuditLog::default());
    let service = ReportService::new(
        Arc::new(InMemoryReportRepository::default()),
        audit.clone(),
        engine,
    );
    let owner = UserId(args.user);

    println!("ITIVA assessment demo for {}", owner);
    let seeded = service.seed_demo(&owner)?;
    for record in &seeded {
        println!(
            "- {} ({}, {}) overall {}",
            record.name,
            record.assessment_type,
            record.date,
            record.overall().unwrap_or_default()
        );
    }

    let dashboard = service.dashboard(&owner)?;
    println!(
        "\nDashboard: {} reports | average score {} | drafts pending: {}",
        dashboard.total_reports,
        dashboard.average_score,
        if dashboard.has_drafts { "yes" } else { "no" }
    );

    if let Some(latest) = seeded.first().and_then(|record| record.outcome.as_ref()) {
        println!("\nLatest report");
        render_report(latest);
    }

    println!("\nLeaderboard");
    for entry in service.leaderboard(10)? {
        println!(
            "  {}. {} - {} ({})",
            entry.rank, entry.owner, entry.overall, entry.name
        );
    }

    println!("\nAudit trail");
    for entry in audit.recent(10) {
        println!(
            "  {} {} {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.actor,
            entry.activity.label()
        );
    }
    Ok(())
}

fn render_report(report: &AssessmentReport) {
    println!("Category scores");
    for category in Category::ordered() {
        println!("  {:<32} {:>3}", category.label(), report.scores.get(category));
    }
    println!("  {:<32} {:>3}", "Overall", report.overall);

    if report.recommendations.is_empty() {
        println!("No recommendations: every answer is already the strongest option.");
        return;
    }
    println!("Recommendations");
    for recommendation in &report.recommendations {
        println!(
            "  [+{:>2}] Q{} {}: {}",
            recommendation.impact_score,
            recommendation.question_id,
            recommendation.category.key(),
            recommendation.text
        );
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(value)?)
}
