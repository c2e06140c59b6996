//! minigit - minimal content-addressed version control

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::Level;

use minigit::ops::{add, branch, commit, fsck, list_branches, log};
use minigit::{read_commit, read_object, read_snapshot, Error, Hash, IoResultExt, Repo};

#[derive(Parser)]
#[command(name = "minigit")]
#[command(about = "minimal content-addressed version control")]
#[command(version)]
struct Cli {
    /// work tree to operate on
    #[arg(short = 'C', long = "dir", default_value = ".")]
    dir: PathBuf,

    /// increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// create an empty repository
    Init,

    /// stage files for the next commit
    Add {
        /// files to stage, relative to the work tree
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// record the staged files as a new commit
    Commit {
        /// commit message
        message: String,
    },

    /// show history of the current branch
    Log {
        /// maximum number of commits to show
        #[arg(short = 'n', long)]
        max_count: Option<usize>,
    },

    /// create a branch at the current commit, or list branches
    Branch {
        /// name of the branch to create
        name: Option<String>,
    },

    /// print a stored object
    CatFile {
        /// object hash (hex)
        object: String,
    },

    /// verify repository integrity
    Fsck,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> minigit::Result<ExitCode> {
    match cli.command {
        Commands::Init => match Repo::init(&cli.dir) {
            Ok(repo) => {
                println!(
                    "initialized empty minigit repository in {}",
                    repo.path().display()
                );
            }
            Err(Error::RepoExists(path)) => {
                println!("already initialized: {}", path.display());
            }
            Err(e) => return Err(e),
        },

        Commands::Add { paths } => {
            let repo = Repo::open(&cli.dir)?;
            for path in &paths {
                let hash = add(&repo, path)?;
                println!("{} {}", hash.short(), path.display());
            }
        }

        Commands::Commit { message } => {
            let repo = Repo::open(&cli.dir)?;
            match commit(&repo, &message) {
                Ok(hash) => println!("{}", hash),
                Err(Error::EmptyIndex) => {
                    println!("nothing to commit");
                    return Ok(ExitCode::FAILURE);
                }
                Err(e) => return Err(e),
            }
        }

        Commands::Log { max_count } => {
            let repo = Repo::open(&cli.dir)?;
            let entries = log(&repo, max_count)?;

            if entries.is_empty() {
                println!("no commits yet");
            }
            for (i, entry) in entries.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print!("{}", entry);
            }
        }

        Commands::Branch { name: Some(name) } => {
            let repo = Repo::open(&cli.dir)?;
            match branch(&repo, &name)? {
                Some(at) => println!("created branch {} at {}", name, at.short()),
                None => println!("created branch {}", name),
            }
        }

        Commands::Branch { name: None } => {
            let repo = Repo::open(&cli.dir)?;
            for info in list_branches(&repo)? {
                let marker = if info.is_current { '*' } else { ' ' };
                match info.commit {
                    Some(hash) => println!("{} {} {}", marker, info.name, hash.short()),
                    None => println!("{} {}", marker, info.name),
                }
            }
        }

        Commands::CatFile { object } => {
            let repo = Repo::open(&cli.dir)?;
            let hash = Hash::from_hex(&object)?;
            cat_file(&repo, &hash)?;
        }

        Commands::Fsck => {
            let repo = Repo::open(&cli.dir)?;
            let report = fsck(&repo)?;

            println!("objects checked: {}", report.objects_checked);
            println!("commits checked: {}", report.commits_checked);

            if !report.problems.is_empty() {
                println!("\nproblems:");
                for problem in &report.problems {
                    println!("  {}", problem);
                }
            }

            if !report.dangling_objects.is_empty() {
                println!("\ndangling objects:");
                for hash in &report.dangling_objects {
                    println!("  {}", hash);
                }
            }

            if !report.stale_temp_files.is_empty() {
                println!("\nstale temp files:");
                for path in &report.stale_temp_files {
                    println!("  {}", path.display());
                }
            }

            if report.is_ok() {
                println!("\nrepository is healthy");
            } else {
                println!("\nrepository has issues");
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// print a commit, a snapshot listing or raw blob bytes
fn cat_file(repo: &Repo, hash: &Hash) -> minigit::Result<()> {
    if let Ok(commit) = read_commit(repo, hash) {
        println!("snapshot {}", commit.snapshot);
        if let Some(parent) = commit.parent {
            println!("parent {}", parent);
        }
        println!("timestamp {}", commit.timestamp);
        println!();
        println!("{}", commit.message);
        return Ok(());
    }

    if let Ok(snapshot) = read_snapshot(repo, hash) {
        for (path, blob) in &snapshot.entries {
            println!("{} {}", blob, path);
        }
        return Ok(());
    }

    let bytes = read_object(repo, hash)?;
    io::stdout().write_all(&bytes).with_path("<stdout>")
}
