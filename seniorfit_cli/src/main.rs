use chrono::Utc;
use clap::{Parser, Subcommand};
use seniorfit_core::achievements::AchievementOverview;
use seniorfit_core::store::require_user;
use seniorfit_core::*;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "seniorfit")]
#[command(about = "Exercise tracking with points, streaks and achievements", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserCommand,
    },

    /// Record an exercise session
    Submit {
        #[arg(long)]
        user: Uuid,

        #[arg(long)]
        exercise: String,

        /// The exercise was finished
        #[arg(long)]
        completed: bool,

        /// The exercise was stopped early
        #[arg(long)]
        aborted: bool,

        /// Seconds of the exercise video watched
        #[arg(long, default_value_t = 0.0)]
        watched: f64,
    },

    /// Suggest the next exercise
    Recommend {
        #[arg(long)]
        user: Uuid,
    },

    /// List all achievements and which ones the user holds
    Achievements {
        #[arg(long)]
        user: Uuid,
    },

    /// List the exercise catalog
    Exercises {
        /// Only show this muscle group
        #[arg(long)]
        group: Option<MuscleGroup>,
    },

    /// Export a user's progress history as CSV
    Export {
        #[arg(long)]
        user: Uuid,

        /// Output file (defaults to stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum UserCommand {
    /// Create a new user
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: Option<String>,

        /// Exercises per week (defaults to the configured target)
        #[arg(long)]
        weekly_target: Option<u32>,
    },

    /// List all users
    List,

    /// Show points, level, streak and goals
    Status {
        #[arg(long)]
        user: Uuid,
    },

    /// Delete all progress and start over
    Reset {
        #[arg(long)]
        user: Uuid,
    },

    /// Delete a user and their progress
    Delete {
        #[arg(long)]
        user: Uuid,
    },
}

fn main() -> ExitCode {
    // Initialize logging
    seniorfit_core::logging::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Command failed: {:?}", e);
            eprintln!("Fehler: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());

    let catalog = catalog_with_config(&config);
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }

    let mut store = FileStore::open(&data_dir)?;
    let out = Output { json: cli.json };

    match cli.command {
        Commands::User { action } => match action {
            UserCommand::Create {
                name,
                email,
                weekly_target,
            } => cmd_create_user(
                &mut store,
                &out,
                &name,
                email,
                weekly_target.unwrap_or(config.goals.weekly_target),
            ),
            UserCommand::List => cmd_list_users(&store, &out),
            UserCommand::Status { user } => cmd_status(&store, &out, user),
            UserCommand::Reset { user } => cmd_reset(&mut store, &out, user),
            UserCommand::Delete { user } => cmd_delete(&mut store, &out, user),
        },
        Commands::Submit {
            user,
            exercise,
            completed,
            aborted,
            watched,
        } => {
            let request = SubmitProgress {
                exercise_id: Some(exercise),
                completed,
                aborted,
                watch_duration: watched,
            };
            cmd_submit(&mut store, &catalog, &out, user, &request)
        }
        Commands::Recommend { user } => cmd_recommend(&mut store, &catalog, &out, user),
        Commands::Achievements { user } => cmd_achievements(&store, &catalog, &out, user),
        Commands::Exercises { group } => cmd_exercises(&catalog, &out, group),
        Commands::Export { user, output } => cmd_export(&store, &catalog, user, output),
    }
}

struct Output {
    json: bool,
}

impl Output {
    /// Print `value` as JSON in JSON mode, otherwise run `text`
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce()) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            text();
        }
        Ok(())
    }
}

fn cmd_create_user(
    store: &mut FileStore,
    out: &Output,
    name: &str,
    email: Option<String>,
    weekly_target: u32,
) -> Result<()> {
    let user = create_user(store, name, email, weekly_target, Utc::now())?;
    out.emit(&user, || {
        println!("✓ Benutzer angelegt: {}", user.name);
        println!("  ID: {}", user.id);
        println!("  Wochenziel: {} Übungen", user.weekly_goal.exercises_target);
    })
}

fn cmd_list_users(store: &FileStore, out: &Output) -> Result<()> {
    let users: Vec<UserStatus> = store.list_users()?.iter().map(UserStatus::of).collect();
    out.emit(&users, || {
        if users.is_empty() {
            println!("Keine Benutzer vorhanden.");
        }
        for user in &users {
            println!(
                "{}  {:<20} Level {:>2}  {:>5} Punkte",
                user.id, user.name, user.level, user.points
            );
        }
    })
}

fn cmd_status(store: &FileStore, out: &Output, user_id: Uuid) -> Result<()> {
    let status = user_status(store, user_id)?;
    out.emit(&status, || display_status(&status))
}

fn display_status(status: &UserStatus) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", status.name);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!(
        "  Level {} ({} Punkte, noch {} bis Level {})",
        status.level,
        status.points,
        status.points_to_next_level,
        status.level + 1
    );
    println!(
        "  Serie: {} Tage (Rekord {})",
        status.daily_streak, status.longest_streak
    );
    println!(
        "  Wochenziel: {}/{}",
        status.weekly_goal.current_progress, status.weekly_goal.exercises_target
    );
    println!(
        "  Diesen Monat: {} Übungen, {} Punkte",
        status.monthly_stats.exercises_completed, status.monthly_stats.points_earned
    );
    println!("  Perfekte Tage: {}", status.perfect_days_count);
    println!("  Erfolge: {}", status.achievements);
    println!();
}

fn cmd_submit(
    store: &mut FileStore,
    catalog: &Catalog,
    out: &Output,
    user_id: Uuid,
    request: &SubmitProgress,
) -> Result<()> {
    let outcome = submit_progress(store, catalog, user_id, request, Utc::now())?;
    out.emit(&outcome, || display_outcome(&outcome))
}

fn display_outcome(outcome: &SubmitOutcome) {
    let g = &outcome.gamification;

    println!("\n✓ Übung gespeichert: +{} Punkte", outcome.points_earned);
    println!("  Gesamt: {} Punkte (Level {})", g.total_points, g.level);
    println!("  {}", g.streak_info.message);
    println!(
        "  Wochenziel: {}/{}{}",
        g.weekly_goal.current,
        g.weekly_goal.target,
        if g.weekly_goal.met { " ✓" } else { "" }
    );

    if g.perfect_day.awarded {
        println!(
            "\n★ Perfekter Tag! +{} Bonuspunkte",
            g.perfect_day.bonus_points
        );
    } else if !g.perfect_day.missing_groups.is_empty() && !g.perfect_day.trained_groups.is_empty()
    {
        let missing: Vec<String> = g
            .perfect_day
            .missing_groups
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("  Noch offen für einen perfekten Tag: {}", missing.join(", "));
    }

    for achievement in outcome.newly_unlocked() {
        println!(
            "\n{} Neuer Erfolg: {}",
            achievement.achievement.icon, achievement.achievement.title
        );
        println!("  {}", achievement.achievement.description);
    }

    println!("\n  „{}“", g.motivational_quote);
    println!();
}

fn cmd_recommend(
    store: &mut FileStore,
    catalog: &Catalog,
    out: &Output,
    user_id: Uuid,
) -> Result<()> {
    let rec = recommend_next(store, catalog, user_id, Utc::now())?;
    out.emit(&rec, || {
        println!("\n╭─────────────────────────────────────────╮");
        println!("│  {}", rec.exercise.muscle_group);
        println!("╰─────────────────────────────────────────╯");
        println!();
        println!("  {}", rec.exercise.title);
        if !rec.exercise.description.is_empty() {
            println!("  {}", rec.exercise.description);
        }
        if let Some(seconds) = rec.exercise.duration_seconds {
            println!("  Dauer: ~{} Sekunden", seconds);
        }
        println!("  Schwierigkeit: {}/5", rec.exercise.difficulty);
        println!("  ID: {}", rec.exercise.id);
        if let Some(ref url) = rec.exercise.video_url {
            println!();
            println!("  ℹ Video: {}", url);
        }
        println!();
    })
}

fn cmd_achievements(
    store: &FileStore,
    catalog: &Catalog,
    out: &Output,
    user_id: Uuid,
) -> Result<()> {
    let user = require_user(store, user_id)?;
    let overview: Vec<AchievementOverview> = achievement_overview(catalog, &user);
    out.emit(&overview, || {
        let held = overview.iter().filter(|a| a.unlocked_at.is_some()).count();
        println!("Erfolge: {}/{}", held, overview.len());
        for entry in &overview {
            let mark = if entry.unlocked_at.is_some() { "✓" } else { " " };
            println!(
                "  [{}] {} {}: {}",
                mark, entry.definition.icon, entry.definition.title, entry.definition.description
            );
        }
    })
}

fn cmd_exercises(catalog: &Catalog, out: &Output, group: Option<MuscleGroup>) -> Result<()> {
    let groups: Vec<MuscleGroup> = match group {
        Some(g) => vec![g],
        None => MuscleGroup::ALL.to_vec(),
    };
    let exercises: Vec<&Exercise> = groups
        .iter()
        .flat_map(|g| catalog.exercises_in_group(*g))
        .collect();

    out.emit(&exercises, || {
        for g in &groups {
            let in_group = catalog.exercises_in_group(*g);
            if in_group.is_empty() {
                continue;
            }
            println!("{}", g);
            for e in in_group {
                println!("  {:<24} {} (Stufe {})", e.id, e.title, e.difficulty);
            }
        }
    })
}

fn cmd_export(
    store: &FileStore,
    catalog: &Catalog,
    user_id: Uuid,
    output: Option<PathBuf>,
) -> Result<()> {
    match output {
        Some(path) => {
            let count = export_progress(store, catalog, user_id, &path)?;
            eprintln!("✓ {} Einträge exportiert nach {}", count, path.display());
        }
        None => {
            require_user(store, user_id)?;
            let records = store.find_progress(&ProgressQuery::for_user(user_id))?;
            export::write_progress_csv(&records, catalog, std::io::stdout().lock())?;
        }
    }
    Ok(())
}

fn cmd_reset(store: &mut FileStore, out: &Output, user_id: Uuid) -> Result<()> {
    let user = reset_progress(store, user_id, Utc::now())?;
    let status = UserStatus::of(&user);
    out.emit(&status, || {
        println!("✓ Fortschritt von {} zurückgesetzt", user.name);
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteSummary {
    deleted: Uuid,
    progress_removed: usize,
}

fn cmd_delete(store: &mut FileStore, out: &Output, user_id: Uuid) -> Result<()> {
    let removed = delete_user(store, user_id)?;
    let summary = DeleteSummary {
        deleted: user_id,
        progress_removed: removed,
    };
    out.emit(&summary, || {
        println!("✓ Benutzer {} gelöscht ({} Einträge)", user_id, removed);
    })
}
