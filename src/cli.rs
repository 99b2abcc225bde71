//! Command line front end

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use dojo::progress::ProgressStore;
use dojo::review::{self, ReviewItem};
use dojo::weak_points::{self, ErrorReport};
use dojo::{Config, FileStorage, Storage};

#[derive(Parser)]
#[command(name = "dojo")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the progress file
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record an exercise answer
    Attempt {
        lesson: String,
        /// The answer was wrong
        #[arg(long)]
        wrong: bool,
    },
    /// Schedule the first review of a concept
    Schedule {
        lesson: String,
        /// Concept id, defaults to the lesson's theory or exercise concept
        concept: Option<String>,
        /// Schedule the exercise concept instead of the theory one
        #[arg(long, conflicts_with = "concept")]
        exercises: bool,
        /// Display label, defaults to the lesson title
        #[arg(short, long)]
        topic: Option<String>,
    },
    /// Complete a review with a performance between 0 and 1
    Review {
        lesson: String,
        concept: String,
        performance: f64,
    },
    /// Show reviews due soon
    Due,
    /// Check whether a module is unlocked
    Gate {
        module: String,
        /// Prerequisite module, defaults to the previous one in the course
        #[arg(long, requires = "mastery")]
        requires: Option<String>,
        /// Mastery the prerequisite must reach
        #[arg(long, requires = "requires")]
        mastery: Option<u8>,
    },
    /// Record a wrong answer against a topic
    Error {
        topic: String,
        lesson: String,
        /// The exercise prompt
        prompt: String,
        #[arg(short, long)]
        suggestion: Option<String>,
    },
    /// List weak points
    WeakPoints {
        #[arg(short, long)]
        module: Option<String>,
        #[arg(short = 'n', long, default_value_t = 5)]
        top: usize,
    },
    /// Drop a weak point once it is under control
    Forgive { topic: String },
    /// Mark a lesson completed
    Complete { lesson: String },
    /// Add XP
    Xp { amount: u64 },
    /// Show a progress summary
    Status,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config = Config::load()?;
        let catalog = config.catalog()?;
        let storage = match self.data_dir {
            Some(dir) => FileStorage::new(dir),
            None => FileStorage::in_data_dir().context("Failed to locate data directory")?,
        };
        tracing::debug!("Progress directory: {:?}", storage.dir());

        let mut store = ProgressStore::open(storage, config.engine, Utc::now()).with_catalog(catalog);
        let command = self.command.unwrap_or(Commands::Status);
        execute(&mut store, command)
    }
}

fn execute<S: Storage>(store: &mut ProgressStore<S>, command: Commands) -> Result<()> {
    let now = Utc::now();

    match command {
        Commands::Attempt { lesson, wrong } => {
            let stats = store.record_attempt(&lesson, !wrong, now);
            println!(
                "{}: {} attempts, {:.0}% correct, mastery {}",
                lesson,
                stats.total_attempts,
                stats.correct_rate() * 100.0,
                stats.mastery_level
            );
            if store.has_mastered(&lesson) {
                println!("Mastered.");
            }
        }
        Commands::Schedule { lesson, concept, exercises, topic } => {
            let known = store.catalog().and_then(|c| c.lesson(&lesson)).cloned();
            let concept = match (concept, &known) {
                (Some(concept), _) => concept,
                (None, Some(l)) if exercises => l.exercise_concept_id(),
                (None, Some(l)) => l.theory_concept_id(),
                (None, None) => anyhow::bail!("Unknown lesson {lesson}; pass a concept id"),
            };
            let topic = topic
                .or_else(|| known.map(|l| l.title))
                .unwrap_or_else(|| concept.clone());
            if store.schedule_review(&lesson, &concept, &topic, now) {
                println!("Scheduled {} for review tomorrow.", topic);
            } else {
                println!("{} is already scheduled.", topic);
            }
        }
        Commands::Review { lesson, concept, performance } => {
            let item = store
                .complete_review(&lesson, &concept, performance, now)
                .with_context(|| format!("No review scheduled for {lesson}/{concept}"))?;
            println!(
                "Next review of {} in {} ({}).",
                item.topic,
                review::interval_label(item.interval),
                item.scheduled_for.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            );
        }
        Commands::Due => {
            let buckets = store.review_buckets(&Local::now());
            print_bucket("Overdue", &buckets.overdue);
            print_bucket("Today", &buckets.today);
            print_bucket("Tomorrow", &buckets.tomorrow);
            print_bucket("This week", &buckets.this_week);
            if buckets.due_now() == 0 && buckets.tomorrow.is_empty() && buckets.this_week.is_empty() {
                println!("Nothing due this week.");
            }
        }
        Commands::Gate { module, requires, mastery } => {
            let blocked = match (requires, mastery) {
                (Some(required), Some(mastery)) => store.check_module_access(&module, &required, mastery),
                _ => store.check_module(&module),
            };
            match blocked {
                None => println!("{} is open.", module),
                Some(blocked) => {
                    println!(
                        "{} is locked: {} at {}% of {}% ({}% of the way there).",
                        module,
                        blocked.required_module_id,
                        blocked.current_mastery,
                        blocked.required_mastery,
                        blocked.unlock_progress()
                    );
                    for missing in &blocked.missing_concepts {
                        println!("  - {}", missing);
                    }
                    let weak = dojo::mastery::relevant_weak_points(&blocked, &store.progress().weak_points);
                    for point in weak {
                        println!("  ! {} ({} errors)", point.topic, point.error_count);
                    }
                }
            }
        }
        Commands::Error { topic, lesson, prompt, suggestion } => {
            let module_id = store
                .catalog()
                .and_then(|c| c.module_of_lesson(&lesson))
                .map(|m| m.id.clone())
                .with_context(|| format!("Unknown lesson {lesson}"))?;
            let mut report =
                ErrorReport::new(topic, module_id, lesson, weak_points::snippet_excerpt(&prompt));
            if let Some(suggestion) = suggestion {
                report = report.with_suggestion(suggestion);
            }
            let point = store.record_error(report, now);
            println!("{}: {} errors recorded.", point.topic, point.error_count);
        }
        Commands::WeakPoints { module, top } => {
            let points = &store.progress().weak_points;
            let listed = match &module {
                Some(module) => weak_points::by_module(points, module),
                None => weak_points::most_frequent(points, top),
            };
            if listed.is_empty() {
                println!("No weak points.");
            }
            for point in listed {
                println!("{} ({} errors, {})", point.topic, point.error_count, point.lesson_id);
                for suggestion in &point.improvement_suggestions {
                    println!("  - {}", suggestion);
                }
            }
        }
        Commands::Forgive { topic } => {
            if store.remove_weak_point(&topic) {
                println!("Removed {}.", topic);
            } else {
                println!("No weak point named {}.", topic);
            }
        }
        Commands::Complete { lesson } => {
            if !store.complete_lesson(&lesson) {
                println!("{} was already completed.", lesson);
                return Ok(());
            }
            let reward = store.catalog().and_then(|c| c.lesson(&lesson)).map(|l| l.xp_reward);
            if let Some(xp) = reward {
                store.add_xp(u64::from(xp));
                println!("Completed {} (+{} XP).", lesson, xp);
            } else {
                println!("Completed {}.", lesson);
            }
        }
        Commands::Xp { amount } => {
            store.add_xp(amount);
            let progress = store.progress();
            println!("{} XP, level {}.", progress.total_xp, progress.level);
        }
        Commands::Status => print_status(store),
    }

    Ok(())
}

fn print_bucket(label: &str, items: &[&ReviewItem]) {
    if items.is_empty() {
        return;
    }
    println!("{} ({}):", label, items.len());
    let now = Utc::now();
    for item in items {
        let retention = review::estimated_retention(item, now)
            .map(|r| format!(", ~{r}% retained"))
            .unwrap_or_default();
        println!(
            "  {} [{}] {:?}{}",
            item.topic,
            item.concept_id,
            review::urgency(item, now),
            retention
        );
    }
}

fn print_status<S: Storage>(store: &mut ProgressStore<S>) {
    let blocked = store.refresh_blocked_modules().len();
    let progress = store.progress();

    println!("Level {} ({} XP, {} into this level)", progress.level, progress.total_xp, progress.xp_into_level());
    println!("Streak {} (best {})", progress.streak, progress.longest_streak);
    println!("Daily goal {}%", progress.daily_goal_percent());
    if let Some(catalog) = store.catalog() {
        println!("Course {}% complete", progress.completion_rate(catalog));
        for module in catalog.modules() {
            println!("  {:<24} {:>3}%", module.id, store.module_mastery(&module.id));
        }
    }
    println!("{} modules locked, {} reviews due", blocked, store.review_buckets(&Local::now()).due_now());
    if !progress.exam_history.is_empty() {
        println!("Exam average {}%", progress.exam_average());
    }
}
