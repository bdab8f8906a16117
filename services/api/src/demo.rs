use crate::infra::DeskService;
use clap::Args;
use leadline::config::{AiConfig, AppConfig, ScoringConfig};
use leadline::error::AppError;
use leadline::workflows::contacts::{
    ContactCsvImporter, ContactDeskService, ContactDraft, ContactStore, MemoryContactStore,
};
use leadline::workflows::distribution::DistributionOptions;
use leadline::workflows::quality::{ContactScorer, QualityAnalysis};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct ScoreArgs {
    /// Contact full name
    #[arg(long)]
    pub(crate) name: Option<String>,
    /// Phone number in local or international format
    #[arg(long)]
    pub(crate) phone: Option<String>,
    #[arg(long)]
    pub(crate) email: Option<String>,
    /// Lead source, e.g. "web form"
    #[arg(long)]
    pub(crate) source: Option<String>,
    #[arg(long)]
    pub(crate) notes: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// CSV export with name, phone, email, source, and notes columns
    pub(crate) path: PathBuf,
    /// Skip the AI assessor even when an API key is configured
    #[arg(long)]
    pub(crate) offline: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Optional contact CSV used instead of the built-in sample contacts
    #[arg(long)]
    pub(crate) contacts_csv: Option<PathBuf>,
    /// Print the distribution report as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let scorer = ContactScorer::from_config(&config.scoring, &config.ai);
    let draft = ContactDraft {
        name: args.name,
        phone: args.phone,
        email: args.email,
        source: args.source,
        notes: args.notes,
    };

    let analysis = scorer.score(&draft).await;
    match serde_json::to_string_pretty(&analysis) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("Analysis unavailable: {err}"),
    }
    Ok(())
}

pub(crate) async fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let ai = if args.offline {
        AiConfig::offline()
    } else {
        config.ai.clone()
    };
    let scorer = ContactScorer::from_config(&config.scoring, &ai);
    let drafts = ContactCsvImporter::from_path(&args.path)?;

    println!("Contact import report: {}", args.path.display());
    if drafts.is_empty() {
        println!("- no contact rows found");
        return Ok(());
    }

    let mut total = 0_u32;
    let mut suspicious = 0_usize;
    for draft in &drafts {
        let analysis = scorer.score(draft).await;
        total += u32::from(analysis.quality_score);
        if analysis.is_suspicious() {
            suspicious += 1;
        }
        render_analysis(draft.trimmed_name().unwrap_or("<no name>"), &analysis);
    }

    println!(
        "\n{} contacts scored | average {:.1} | {} flagged suspicious",
        drafts.len(),
        f64::from(total) / drafts.len() as f64,
        suspicious
    );
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let drafts = match &args.contacts_csv {
        Some(path) => ContactCsvImporter::from_path(path)?,
        None => sample_contacts(),
    };

    let store: Arc<dyn ContactStore> = Arc::new(MemoryContactStore::new());
    let scorer = ContactScorer::from_config(&ScoringConfig::default(), &AiConfig::offline());
    let desk: DeskService = ContactDeskService::new(store, scorer, DistributionOptions::default());
    let advisors = desk.seed_default_advisors()?;

    println!("Contact desk demo (offline assessor)");
    println!("Advisors:");
    for advisor in &advisors {
        println!(
            "  - {} | performance {:.0} | capacity {}",
            advisor.name, advisor.performance_score, advisor.max_contacts
        );
    }

    println!("\nIntake:");
    for draft in drafts {
        let label = draft.trimmed_name().unwrap_or("<no name>").to_string();
        match desk.register_contact(draft).await {
            Ok(registered) => render_analysis(&label, &registered.analysis),
            Err(err) => println!("  - {label}: rejected ({err})"),
        }
    }

    let report = desk.distribute_contacts()?;
    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("\n{json}"),
            Err(err) => println!("\nDistribution payload unavailable: {err}"),
        }
        return Ok(());
    }

    println!("\nDistribution: {}", report.message);
    for assignment in &report.assignments {
        println!(
            "  - {} (score {}) -> {}",
            assignment.contact_name, assignment.quality_score, assignment.advisor_name
        );
    }
    for contact in &report.unassigned_contacts {
        println!("  - {} left unassigned", contact.name);
    }

    let health = desk.database_health()?;
    println!(
        "\nDesk health: {} contacts | {} assigned | {} suspicious | {} remaining capacity",
        health.total_contacts,
        health.assigned_contacts,
        health.suspicious_contacts,
        health.available_capacity
    );
    for advisor in &advisors {
        let workload = desk.advisor_workload(advisor.id)?;
        println!(
            "  - {}: {}/{} contacts ({:.0}% utilized)",
            workload.name,
            workload.current_contacts,
            workload.max_contacts,
            workload.utilization * 100.0
        );
    }

    Ok(())
}

fn render_analysis(label: &str, analysis: &QualityAnalysis) {
    let flag = if analysis.is_suspicious() {
        " [suspicious]"
    } else {
        ""
    };
    println!("  - {label}: score {}{flag}", analysis.quality_score);
    for issue in &analysis.issues {
        println!("      issue: {}", issue.message);
    }
}

fn sample_contacts() -> Vec<ContactDraft> {
    let contact = |name: &str, phone: &str, email: Option<&str>, source: &str| ContactDraft {
        name: Some(name.to_string()),
        phone: Some(phone.to_string()),
        email: email.map(str::to_string),
        source: Some(source.to_string()),
        notes: None,
    };

    vec![
        contact(
            "Mariana Torres",
            "+52 55 1234 5678",
            Some("mariana.torres@example.com"),
            "web form",
        ),
        contact("Luis Herrera", "55 8765 4321", None, "referral"),
        contact(
            "Sofia Ramirez",
            "+52 33 2345 6789",
            Some("sofia.ramirez@example.com"),
            "trade show",
        ),
        contact("Demo User", "5555555555", Some("test@test.com"), "import"),
        contact("Pedro", "12345", Some("pedro-at-example"), "cold list"),
    ]
}
