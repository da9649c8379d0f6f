use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use pttrack_core::models::NewActionItem;
use pttrack_core::repositories::action_items::ActionItemService;
use pttrack_core::repositories::patients::PatientService;
use pttrack_core::repositories::roster::RosterService;
use pttrack_core::{
    utc_offset_from_env_value, ActionItemId, ClinicContext, CoreConfig, LookupId, PatientId,
    ProviderId, DEFAULT_PATIENT_DATA_DIR,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "pttrack")]
#[command(about = "Volunteer clinic patient tracker CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List patients
    List {
        /// Sort order: last_name or latest_workup
        #[arg(long)]
        sort: Option<String>,
        /// Filter: unsigned_workup, active, ai_active or ai_inactive
        #[arg(long)]
        filter: Option<String>,
    },
    /// Show a patient's chart
    Chart {
        /// Patient id
        patient: u64,
        /// Print the chart as JSON
        #[arg(long)]
        json: bool,
    },
    /// Flip a patient's active flag
    ToggleActive {
        /// Patient id
        patient: u64,
    },
    /// Add an action item
    AddActionItem {
        /// Patient id
        patient: u64,
        /// Id of the provider writing the item
        provider: u64,
        /// Due date (YYYY-MM-DD)
        due_date: NaiveDate,
        /// Action instruction id
        #[arg(long, default_value_t = 1)]
        instruction: u32,
        /// Free-text comments
        #[arg(long, default_value = "")]
        comments: String,
    },
    /// Mark an action item done
    MarkDone {
        /// Action item id
        action_item: u64,
        /// Id of the resolving provider
        provider: u64,
    },
    /// Reopen an action item
    ClearDone {
        /// Action item id
        action_item: u64,
    },
    /// Print the reference tables in use
    Reference,
}

/// Build the clinic context from the same environment variables the server reads.
fn open_context() -> Result<ClinicContext, Box<dyn std::error::Error>> {
    let patient_data_dir = std::env::var("PATIENT_DATA_DIR")
        .unwrap_or_else(|_| DEFAULT_PATIENT_DATA_DIR.into());
    let reference_data = std::env::var("PTTRACK_REFERENCE_DATA")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);
    let utc_offset = utc_offset_from_env_value(std::env::var("PTTRACK_UTC_OFFSET").ok())?;

    let cfg = CoreConfig::new(PathBuf::from(patient_data_dir), reference_data, utc_offset)?;
    Ok(ClinicContext::open(Arc::new(cfg))?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'pttrack --help' for commands");
        return Ok(());
    };

    let ctx = open_context()?;

    match command {
        Commands::List { sort, filter } => {
            let roster = RosterService::new(ctx);
            let rows = roster.query(sort.as_deref(), filter.as_deref())?;
            if rows.is_empty() {
                println!("No patients found.");
            }
            for row in rows {
                let latest = match &row.latest_workup {
                    Some(workup) => format!("last seen {}", workup.clinic_day.clinic_date),
                    None => format!("no workup since {}", row.history.last.history_date.date_naive()),
                };
                println!(
                    "ID: {}, Name: {}, Active: {}, Action items: {} active / {} pending, {}",
                    row.id,
                    row.name,
                    if row.needs_workup { "yes" } else { "no" },
                    row.active_action_items,
                    row.inactive_action_items,
                    latest
                );
            }
        }
        Commands::Chart { patient, json } => {
            let chart = PatientService::new(ctx).chart(PatientId(patient))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&chart)?);
                return Ok(());
            }

            println!("{} ({}, {} years)", chart.name, chart.gender_label, chart.age);
            println!("Action items:");
            for (label, entries) in [
                ("active", &chart.action_items.active),
                ("pending", &chart.action_items.inactive),
                ("done", &chart.action_items.done),
            ] {
                for entry in entries {
                    println!(
                        "  [{label}] #{} {} due {} ({})",
                        entry.item.id, entry.instruction_label, entry.item.due_date, entry.attribution
                    );
                }
            }
            println!("Encounters:");
            for encounter in &chart.timeline {
                println!("  {} {}", encounter.occurred_on(), encounter.short_text());
            }
            println!("Referrals:");
            for referral in &chart.referrals {
                println!(
                    "  #{} {} at {} ({})",
                    referral.referral.id,
                    referral.kind_label,
                    referral.location_labels.join(", "),
                    referral.status_label
                );
                for request in &referral.followup_requests {
                    for contact in &request.contacts {
                        println!("    {}", contact.summary);
                    }
                }
            }
        }
        Commands::ToggleActive { patient } => {
            let active = PatientService::new(ctx).toggle_active(PatientId(patient))?;
            println!(
                "Patient {} is now {}",
                patient,
                if active { "active" } else { "inactive" }
            );
        }
        Commands::AddActionItem {
            patient,
            provider,
            due_date,
            instruction,
            comments,
        } => {
            let item = ActionItemService::new(ctx).add(
                ProviderId(provider),
                PatientId(patient),
                NewActionItem {
                    due_date,
                    instruction: LookupId(instruction),
                    comments,
                },
            )?;
            println!("Added action item {} due {}", item.id, item.due_date);
        }
        Commands::MarkDone {
            action_item,
            provider,
        } => {
            let item = ActionItemService::new(ctx)
                .mark_done(ActionItemId(action_item), ProviderId(provider))?;
            println!("Marked action item {} done", item.id);
        }
        Commands::ClearDone { action_item } => {
            let item = ActionItemService::new(ctx).clear_done(ActionItemId(action_item))?;
            println!("Reopened action item {}", item.id);
        }
        Commands::Reference => {
            let reference = ctx.store().read(|data| data.reference.clone())?;
            for result in &reference.contact_results {
                println!(
                    "contact result {}: {} (reached: {})",
                    result.id, result.name, result.patient_reached
                );
            }
            for location in &reference.referral_locations {
                println!("referral location {}: {}", location.id, location.name);
            }
            for instruction in &reference.action_instructions {
                println!("action instruction {}: {}", instruction.id, instruction.name);
            }
            for provider_type in &reference.provider_types {
                println!(
                    "provider type {}: {} ({})",
                    provider_type.id, provider_type.long_name, provider_type.short_name
                );
            }
        }
    }

    Ok(())
}
