use api_shared::dto::{
    self, AlertDto, AppointmentDto, DiagnosisDto, DoctorDto, HospitalDto, MedicationDto,
    PatientDto, TestDto, TreatmentDto,
};
use api_shared::HealthService;
use caregraph_core::model::GraphEntity;
use caregraph_core::{GraphConfig, Repositories, Repository};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "caregraph")]
#[command(about = "CareGraph healthcare graph CLI")]
struct Cli {
    /// Load the sample data before running the command (useful with the memory store)
    #[arg(long, global = true)]
    seed: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the sample data set once
    Seed,
    /// Check graph store connectivity
    Health,
    /// Print node and relationship counts as JSON
    Stats,
    /// List every entity of a kind as JSON
    List {
        /// Entity kind
        kind: Kind,
    },
    /// Show one entity as JSON (`null` when absent)
    Show {
        /// Entity kind
        kind: Kind,
        /// Entity id
        id: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Kind {
    Patient,
    Doctor,
    Hospital,
    Appointment,
    Diagnosis,
    Treatment,
    Medication,
    Test,
    Alert,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("caregraph=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'caregraph --help' for commands");
        return Ok(());
    };

    let cfg = GraphConfig::from_env()?;
    let store = caregraph_core::connect(&cfg).await?;
    let repos = Repositories::new(store.clone());

    if cli.seed && !matches!(command, Commands::Seed) {
        caregraph_core::seed(&repos).await?;
    }

    match command {
        Commands::Seed => {
            caregraph_core::seed(&repos).await?;
            println!("Sample data loaded into {}", store.backend_name());
        }
        Commands::Health => {
            println!("{}", HealthService::new(store).check_graph().await);
        }
        Commands::Stats => {
            print_json(&serde_json::to_value(repos.stats().await?)?)?;
        }
        Commands::List { kind } => {
            print_json(&list(&repos, kind).await?)?;
        }
        Commands::Show { kind, id } => {
            print_json(&show(&repos, kind, &id).await?)?;
        }
    }

    Ok(())
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn list(repos: &Repositories, kind: Kind) -> anyhow::Result<Value> {
    match kind {
        Kind::Patient => list_as::<_, PatientDto>(&repos.patients).await,
        Kind::Doctor => list_as::<_, DoctorDto>(&repos.doctors).await,
        Kind::Hospital => list_as::<_, HospitalDto>(&repos.hospitals).await,
        Kind::Appointment => list_as::<_, AppointmentDto>(&repos.appointments).await,
        Kind::Diagnosis => list_as::<_, DiagnosisDto>(&repos.diagnoses).await,
        Kind::Treatment => list_as::<_, TreatmentDto>(&repos.treatments).await,
        Kind::Medication => list_as::<_, MedicationDto>(&repos.medications).await,
        Kind::Test => list_as::<_, TestDto>(&repos.tests).await,
        Kind::Alert => list_as::<_, AlertDto>(&repos.alerts).await,
    }
}

async fn show(repos: &Repositories, kind: Kind, id: &str) -> anyhow::Result<Value> {
    match kind {
        Kind::Patient => show_as::<_, PatientDto>(&repos.patients, id).await,
        Kind::Doctor => show_as::<_, DoctorDto>(&repos.doctors, id).await,
        Kind::Hospital => show_as::<_, HospitalDto>(&repos.hospitals, id).await,
        Kind::Appointment => show_as::<_, AppointmentDto>(&repos.appointments, id).await,
        Kind::Diagnosis => show_as::<_, DiagnosisDto>(&repos.diagnoses, id).await,
        Kind::Treatment => show_as::<_, TreatmentDto>(&repos.treatments, id).await,
        Kind::Medication => show_as::<_, MedicationDto>(&repos.medications, id).await,
        Kind::Test => show_as::<_, TestDto>(&repos.tests, id).await,
        Kind::Alert => show_as::<_, AlertDto>(&repos.alerts, id).await,
    }
}

async fn list_as<T, D>(repo: &Repository<T>) -> anyhow::Result<Value>
where
    T: GraphEntity,
    D: Serialize + for<'a> From<&'a T>,
{
    let dtos: Vec<D> = repo.find_all().await?.iter().map(D::from).collect();
    Ok(serde_json::to_value(dtos)?)
}

async fn show_as<T, D>(repo: &Repository<T>, id: &str) -> anyhow::Result<Value>
where
    T: GraphEntity,
    D: Serialize + for<'a> From<&'a T>,
{
    let found = repo.find_by_id(id).await?;
    let dto: Option<D> = dto::to_dto(found.as_ref());
    Ok(serde_json::to_value(dto)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use caregraph_core::MemoryGraphStore;
    use std::sync::Arc;

    async fn seeded() -> Repositories {
        let repos = Repositories::new(Arc::new(MemoryGraphStore::new()));
        caregraph_core::seed(&repos).await.unwrap();
        repos
    }

    #[test]
    fn parses_show_command() {
        let cli = Cli::try_parse_from(["caregraph", "show", "medication", "M001"]).unwrap();
        match cli.command {
            Some(Commands::Show { kind, id }) => {
                assert_eq!(kind, Kind::Medication);
                assert_eq!(id, "M001");
            }
            _ => panic!("expected show command"),
        }
        assert!(!cli.seed);
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["caregraph", "list", "ward"]).is_err());
    }

    #[test]
    fn seed_flag_is_global() {
        let cli = Cli::try_parse_from(["caregraph", "stats", "--seed"]).unwrap();
        assert!(cli.seed);
    }

    #[tokio::test]
    async fn list_emits_one_dto_per_entity() {
        let repos = seeded().await;
        for kind in Kind::value_variants() {
            let value = list(&repos, *kind).await.unwrap();
            assert_eq!(value.as_array().map(Vec::len), Some(1), "{kind:?}");
        }
    }

    #[tokio::test]
    async fn show_missing_is_null() {
        let repos = seeded().await;
        let value = show(&repos, Kind::Patient, "does-not-exist").await.unwrap();
        assert!(value.is_null());
    }

    #[tokio::test]
    async fn show_alert_uses_type_key() {
        let repos = seeded().await;
        let id = repos.alerts.find_all().await.unwrap()[0].entity_id().to_string();
        let value = show(&repos, Kind::Alert, &id).await.unwrap();
        assert_eq!(value["alertId"], id.as_str());
        assert!(value.get("type").is_some());
        assert!(value["resolved"].is_boolean());
    }
}
