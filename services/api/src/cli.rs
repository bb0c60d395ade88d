use crate::demo::{run_demo, run_job_import, DemoArgs, JobImportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use job_portal::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Job Portal",
    about = "Run the job portal API or exercise it from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Work with job posting exports
    Jobs {
        #[command(subcommand)]
        command: JobsCommand,
    },
    /// Walk an application through its lifecycle against in-memory storage
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum JobsCommand {
    /// Parse and validate a CSV of job postings and print a summary
    Import(JobImportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Jobs {
            command: JobsCommand::Import(args),
        } => run_job_import(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["job-portal"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn jobs_import_requires_csv_path() {
        assert!(Cli::try_parse_from(["job-portal", "jobs", "import"]).is_err());

        let cli = Cli::try_parse_from(["job-portal", "jobs", "import", "--csv", "jobs.csv"])
            .expect("parses");
        match cli.command {
            Some(Command::Jobs {
                command: JobsCommand::Import(args),
            }) => assert_eq!(args.csv.to_str(), Some("jobs.csv")),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
