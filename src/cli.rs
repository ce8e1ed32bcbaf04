// picasa2digikam CLI binary

use std::io::Write;
use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Parser;

use picasa2digikam::backup::backup_database;
use picasa2digikam::db::open_db;
use picasa2digikam::migrate::{run_migration, MigrationOptions, MigrationStats};

#[derive(Parser)]
#[command(name = "picasa2digikam")]
#[command(about = "Migrate stars, albums and face tags from Picasa sidecar files into digiKam", long_about = None)]
#[command(version)]
struct Cli {
    /// Root of the photo tree that carries .picasa.ini files
    #[arg(long = "photos_dir")]
    photos_dir: PathBuf,

    /// digiKam database file (digikam4.db)
    #[arg(long = "digikam_db")]
    digikam_db: PathBuf,

    /// Picasa's contacts.xml; its names override the ones in the sidecar files
    #[arg(long)]
    contacts: Option<PathBuf>,

    /// Resolve everything and report, but do not change the database
    #[arg(long = "dry_run")]
    dry_run: bool,

    /// More output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Skip a face when digiKam already has the same rectangle on the image
    #[arg(long = "skip_same_rect", overrides_with = "no_skip_same_rect")]
    skip_same_rect: bool,

    /// Tag a face even when digiKam already has the same rectangle on the image
    #[arg(long = "no-skip_same_rect", overrides_with = "skip_same_rect")]
    no_skip_same_rect: bool,

    /// Write run statistics as JSON to this file
    #[arg(long = "stats_json")]
    stats_json: Option<PathBuf>,
}

impl Cli {
    fn skip_same_rect(&self) -> Option<bool> {
        match (self.skip_same_rect, self.no_skip_same_rect) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let photos_dir = cli.photos_dir.canonicalize()
        .map_err(|_| anyhow::anyhow!("Photos directory does not exist: {}", cli.photos_dir.display()))?;

    if !cli.dry_run {
        backup_database(&cli.digikam_db)
            .with_context(|| format!("Failed to back up {}", cli.digikam_db.display()))?;
    }

    let db = open_db(&cli.digikam_db, cli.dry_run)?;
    let options = MigrationOptions {
        dry_run: cli.dry_run,
        contacts_file: cli.contacts.clone(),
        skip_same_rect: cli.skip_same_rect(),
    };

    let stats = run_migration(&photos_dir, &db, &options)
        .with_context(|| format!("Migration of {} failed, nothing was changed", photos_dir.display()))?;

    print_stats(&stats, cli.dry_run);
    if let Some(path) = &cli.stats_json {
        let json = serde_json::to_string_pretty(&stats)?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(())
}

/// `LEVEL: message` lines on stdout; RUST_LOG takes precedence over -v.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| writeln!(buf, "{}: {}", record.level(), record.args()))
        .target(env_logger::Target::Stdout)
        .init();
}

fn print_stats(stats: &MigrationStats, dry_run: bool) {
    println!();
    if dry_run {
        println!("Dry run complete, nothing was written:");
    } else {
        println!("Migration complete:");
    }
    println!("  Directories:  {} ({} skipped)", stats.directories_visited, stats.directories_skipped);
    println!("  Files:        {}", stats.files_migrated);
    println!("  Stars:        {}", stats.stars_applied);
    println!("  Album tags:   {}", stats.album_tags_attached);
    println!("  Faces:        {}", stats.faces_tagged);
    println!("  Regions:      {}", stats.regions_written);
    println!("  Warnings:     {}", stats.warnings);
    println!("  Mutations:    {}", stats.mutations());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["picasa2digikam", "--photos_dir", "/p", "--digikam_db", "/d.db"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_skip_same_rect_is_tri_state() {
        assert_eq!(None, parse(&[]).skip_same_rect());
        assert_eq!(Some(true), parse(&["--skip_same_rect"]).skip_same_rect());
        assert_eq!(Some(false), parse(&["--no-skip_same_rect"]).skip_same_rect());
        assert_eq!(Some(true), parse(&["--no-skip_same_rect", "--skip_same_rect"]).skip_same_rect());
    }

    #[test]
    fn test_flags() {
        let cli = parse(&["--dry_run", "-vv", "--contacts", "/c.xml"]);
        assert!(cli.dry_run);
        assert_eq!(2, cli.verbose);
        assert_eq!(Some(PathBuf::from("/c.xml")), cli.contacts);
        assert!(Cli::try_parse_from(["picasa2digikam", "--photos_dir", "/p"]).is_err());
    }
}
