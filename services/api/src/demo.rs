use crate::infra::{parse_timestamp, PortalServices};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use job_portal::config::PortalConfig;
use job_portal::error::AppError;
use job_portal::portal::applications::{
    ApplicationDocuments, ApplicationRecord, ApplicationStatus, ApplicationSubmission,
    EmployerFeedback, InterviewMode, InterviewRequest, PersonalInfo, StatusChange,
};
use job_portal::portal::import::{JobCsvImporter, PublishedImport};
use job_portal::portal::jobs::{EmploymentType, JobDraft, JobId, JobQuery, SalaryRange};
use job_portal::portal::Actor;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Optional CSV export used to populate the job board before the walkthrough.
    #[arg(long)]
    pub(crate) jobs_csv: Option<PathBuf>,
    /// Clock used for the walkthrough (RFC 3339 or YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = parse_timestamp)]
    pub(crate) now: Option<DateTime<Utc>>,
}

#[derive(Args, Debug)]
pub(crate) struct JobImportArgs {
    /// CSV export of job postings
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Clock used for expiry checks (RFC 3339 or YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = parse_timestamp)]
    pub(crate) now: Option<DateTime<Utc>>,
}

pub(crate) fn run_job_import(args: JobImportArgs) -> Result<(), AppError> {
    let now = args.now.unwrap_or_else(Utc::now);
    let import = JobCsvImporter::from_path(&args.csv)?;
    let parsed = import.jobs.len() + import.rejected.len();

    let services = PortalServices::in_memory(&PortalConfig::default());
    let outcome = import.publish(services.jobs.as_ref(), now);

    println!("Job import: {}", args.csv.display());
    render_import(parsed, &outcome);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let now = args.now.unwrap_or_else(Utc::now);
    let services = PortalServices::in_memory(&PortalConfig::default());

    println!("Job portal demo");
    if let Some(path) = args.jobs_csv.as_deref() {
        let outcome = services.seed_from_csv(path, now)?;
        println!("\nSeeded job board from {}", path.display());
        render_import(outcome.published.len() + outcome.rejected.len(), &outcome);
    }

    let employer = Actor::employer("emp-demo");
    let applicant = Actor::applicant("seeker-demo");
    let second_applicant = Actor::applicant("seeker-late");

    let job = match services.jobs.create(&employer, demo_job(now), now) {
        Ok(job) => job,
        Err(err) => {
            println!("  Posting rejected: {}", err);
            return Ok(());
        }
    };
    println!(
        "\nPosted {} \"{}\" at {} ({}, {}-{} {})",
        job.id,
        job.title,
        job.company,
        job.employment_type.label(),
        job.salary.min,
        job.salary.max,
        job.salary.currency
    );

    match services.jobs.list(&JobQuery::default(), now) {
        Ok(page) => println!("Active postings on the board: {}", page.total),
        Err(err) => println!("Listing unavailable: {}", err),
    }

    println!("\nApplication lifecycle");
    let record = match services.applications.apply(
        &job.id,
        &applicant,
        demo_submission("Dana Demo", "dana@example.com"),
        now + Duration::minutes(5),
    ) {
        Ok(record) => record,
        Err(err) => {
            println!("  Application rejected: {}", err);
            return Ok(());
        }
    };
    println!("  {} received from {} [{}]", record.id, record.applicant, record.status);

    let steps = [
        (ApplicationStatus::Reviewing, "screening call booked"),
        (ApplicationStatus::Shortlisted, "strong portfolio"),
    ];
    let mut latest = record;
    for (offset, (status, notes)) in steps.into_iter().enumerate() {
        let change = StatusChange {
            status,
            notes: Some(notes.to_string()),
            expected_version: Some(latest.version),
        };
        let at = now + Duration::minutes(10 + offset as i64);
        match services
            .applications
            .transition(&latest.id, &employer, change, at)
        {
            Ok(updated) => latest = updated,
            Err(err) => {
                println!("  Transition to {} refused: {}", status, err);
                return Ok(());
            }
        }
    }

    let interview = InterviewRequest {
        scheduled_at: now + Duration::days(2),
        mode: InterviewMode::Video,
        location: None,
        notes: Some("45 minute technical conversation".to_string()),
    };
    match services.applications.schedule_interview(
        &latest.id,
        &employer,
        interview,
        now + Duration::minutes(20),
    ) {
        Ok(updated) => latest = updated,
        Err(err) => println!("  Interview not scheduled: {}", err),
    }

    let feedback = EmployerFeedback {
        rating: 4,
        notes: Some("clear communicator".to_string()),
    };
    match services.applications.record_feedback(
        &latest.id,
        &employer,
        feedback,
        now + Duration::minutes(25),
    ) {
        Ok(updated) => latest = updated,
        Err(err) => println!("  Feedback not recorded: {}", err),
    }

    render_timeline(&latest);

    println!("\nWithdrawal");
    match services.applications.apply(
        &job.id,
        &second_applicant,
        demo_submission("Lee Late", "lee@example.com"),
        now + Duration::minutes(30),
    ) {
        Ok(late) => {
            print_counter(&services, &job.id);
            match services
                .applications
                .withdraw(&late.id, &second_applicant, now + Duration::minutes(35))
            {
                Ok(withdrawn) => println!("  {} is now {}", withdrawn.id, withdrawn.status),
                Err(err) => println!("  Withdrawal refused: {}", err),
            }
        }
        Err(err) => println!("  Second application rejected: {}", err),
    }
    print_counter(&services, &job.id);

    match services.applications.list_for_job(&job.id, &employer, None) {
        Ok(records) => {
            println!("\nOwner view of {}", job.id);
            for record in records {
                let summary = record.summary();
                println!(
                    "  {} {} [{}] timeline entries: {}",
                    summary.id, summary.full_name, summary.status, summary.timeline_entries
                );
            }
        }
        Err(err) => println!("\nOwner view unavailable: {}", err),
    }

    Ok(())
}

fn demo_job(now: DateTime<Utc>) -> JobDraft {
    JobDraft {
        title: "Backend Engineer".to_string(),
        company: "Demo Works".to_string(),
        location: "Remote".to_string(),
        category: "Engineering".to_string(),
        description: "Design and run the hiring platform APIs.".to_string(),
        requirements: vec!["Rust".to_string(), "PostgreSQL".to_string()],
        salary: SalaryRange {
            min: 90_000,
            max: 120_000,
            currency: "USD".to_string(),
        },
        employment_type: EmploymentType::FullTime,
        remote: true,
        status: None,
        expires_at: Some(now + Duration::days(30)),
    }
}

fn demo_submission(name: &str, email: &str) -> ApplicationSubmission {
    ApplicationSubmission {
        personal_info: PersonalInfo {
            full_name: name.to_string(),
            email: email.to_string(),
            phone: None,
        },
        documents: ApplicationDocuments {
            resume: Some(format!("uploads/{}/resume.pdf", email)),
            cover_letter: None,
        },
        answers: Vec::new(),
    }
}

fn render_timeline(record: &ApplicationRecord) {
    println!(
        "  {} is {} (version {}, {} interview(s))",
        record.id,
        record.status,
        record.version,
        record.interviews.len()
    );
    for entry in record.timeline.entries() {
        println!(
            "    {} {} by {}{}",
            entry.at.format("%Y-%m-%d %H:%M"),
            entry.status,
            entry.actor,
            entry
                .notes
                .as_deref()
                .map(|notes| format!(" ({notes})"))
                .unwrap_or_default()
        );
    }
    if let Some(feedback) = &record.feedback {
        println!("  Employer rating: {}/{}", feedback.rating, EmployerFeedback::MAX_RATING);
    }
}

fn print_counter(services: &PortalServices, job_id: &JobId) {
    match services.jobs.get(job_id) {
        Ok(job) => println!("  Applications on {}: {}", job.id, job.applications_count),
        Err(err) => println!("  Counter unavailable: {}", err),
    }
}

fn render_import(parsed: usize, outcome: &PublishedImport) {
    println!(
        "  Rows: {} parsed, {} published, {} rejected",
        parsed,
        outcome.published.len(),
        outcome.rejected.len()
    );
    for posting in &outcome.published {
        println!(
            "  + {} {} ({}, {})",
            posting.id, posting.title, posting.company, posting.status
        );
    }
    for row in &outcome.rejected {
        println!("  - {}", row);
    }
}
