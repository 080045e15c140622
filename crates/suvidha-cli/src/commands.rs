use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use suvidha_ledger::{
    fixed_rule_set, Block, Certificate, Ledger, LedgerReader, LedgerWriter, MintRequest,
    VerificationReport,
};
use suvidha_server::SuvidhaServer;
use suvidha_store::FileStore;
use suvidha_types::Digest;

use crate::cli::*;
use crate::config::CliConfig;

struct Session {
    data_dir: PathBuf,
    format: OutputFormat,
    config: CliConfig,
}

impl Session {
    fn open_ledger(&self) -> anyhow::Result<Ledger<FileStore>> {
        let store = FileStore::open(&self.data_dir)
            .with_context(|| format!("opening data dir {}", self.data_dir.display()))?;
        Ok(Ledger::open(store, self.config.ledger.clone())?)
    }

    /// Print `value` as JSON, or hand it to `text` for human output.
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce(&T)) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Text => text(value),
        }
        Ok(())
    }
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load(cli.config.as_deref(), &cli.data_dir)?;
    let ctx = Session {
        data_dir: cli.data_dir,
        format: cli.format,
        config,
    };

    match cli.command {
        Command::Append(args) => cmd_append(&ctx, args),
        Command::Log(args) => cmd_log(&ctx, args),
        Command::Verify(args) => cmd_verify(&ctx, args),
        Command::Stats => cmd_stats(&ctx),
        Command::Mint(args) => cmd_mint(&ctx, args),
        Command::Certificate(args) => cmd_certificate(&ctx, args),
        Command::Rules => cmd_rules(&ctx),
        Command::Serve(args) => cmd_serve(ctx, args),
        Command::Config => cmd_config(&ctx),
    }
}

fn cmd_append(ctx: &Session, args: AppendArgs) -> anyhow::Result<()> {
    let ledger = ctx.open_ledger()?;
    let block = ledger.append(&args.entity_id, args.action, &args.actor, &args.details)?;
    ctx.emit(&block, |b| {
        println!("{} Block #{} appended", "✓".green().bold(), b.sequence_number);
        print_block(b);
    })
}

fn cmd_log(ctx: &Session, args: LogArgs) -> anyhow::Result<()> {
    let ledger = ctx.open_ledger()?;
    let mut blocks = match &args.entity_id {
        Some(entity) => ledger.transactions_for(entity)?,
        None => ledger.all_transactions()?,
    };
    if let Some(limit) = args.limit {
        let skip = blocks.len().saturating_sub(limit);
        blocks.drain(..skip);
    }

    ctx.emit(&blocks, |blocks| {
        if blocks.is_empty() {
            println!("No blocks.");
        }
        for block in blocks.iter().rev() {
            if args.oneline {
                println!(
                    "{} {} {} {}",
                    format!("#{}", block.sequence_number).yellow(),
                    block.digest.short_hex().dimmed(),
                    block.payload.entity_id.bold(),
                    block.payload.action
                );
            } else {
                print_block(block);
                println!();
            }
        }
    })
}

fn cmd_verify(ctx: &Session, args: VerifyArgs) -> anyhow::Result<()> {
    let ledger = ctx.open_ledger()?;
    let report = match &args.entity_id {
        Some(entity) => ledger.verify(entity)?,
        None => ledger.verify_ledger()?,
    };
    ctx.emit(&report, print_report)?;
    if !report.valid {
        bail!("{} integrity violation(s) found", report.violations.len());
    }
    Ok(())
}

fn cmd_stats(ctx: &Session) -> anyhow::Result<()> {
    let stats = ctx.open_ledger()?.statistics()?;
    ctx.emit(&stats, |s| {
        println!("Blocks:    {}", s.total_blocks.to_string().bold());
        println!("Entities:  {}", s.distinct_entities.to_string().bold());
        println!("Size:      {} bytes", s.approximate_storage_size);
        match &s.latest_block {
            Some(b) => println!(
                "Latest:    #{} {} ({})",
                b.sequence_number,
                b.digest.short_hex().yellow(),
                b.payload.entity_id
            ),
            None => println!("Latest:    {}", "none".dimmed()),
        }
    })
}

fn cmd_mint(ctx: &Session, args: MintArgs) -> anyhow::Result<()> {
    let mut request = MintRequest::new(args.entity_id, args.rating);
    request.issuer_id = args.issuer;
    request.recipient_id = args.recipient;
    for pair in &args.metadata {
        let (key, raw) = pair
            .split_once('=')
            .with_context(|| format!("metadata {pair:?} is not KEY=VALUE"))?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        request = request.with_metadata(key, value);
    }

    let certificate = ctx.open_ledger()?.mint(&request)?;
    ctx.emit(&certificate, |c| {
        println!("{} Certificate minted", "✓".green().bold());
        print_certificate(c);
    })
}

fn cmd_certificate(ctx: &Session, args: CertificateArgs) -> anyhow::Result<()> {
    let ledger = ctx.open_ledger()?;

    if let Some(token) = &args.token_id {
        let token: Digest = token.parse().context("token id must be 64 hex characters")?;
        let verification = ledger.verify_certificate(&token)?;
        ctx.emit(&verification, |v| match (&v.certificate, v.valid) {
            (Some(c), true) => {
                println!("{} Certificate is anchored in the ledger", "✓".green().bold());
                print_certificate(c);
            }
            (Some(c), false) => {
                println!("{} Linked block is missing from the ledger", "✗".red().bold());
                print_certificate(c);
            }
            (None, _) => println!("{} No certificate with that token", "✗".red().bold()),
        })?;
        if !verification.valid {
            bail!("certificate {} is not valid", token.short_hex());
        }
        return Ok(());
    }

    let certificates = match &args.entity {
        Some(entity) => ledger.certificate_for(entity)?.into_iter().collect(),
        None => ledger.certificates()?,
    };
    ctx.emit(&certificates, |list: &Vec<Certificate>| {
        if list.is_empty() {
            println!("No certificates.");
        }
        for c in list {
            print_certificate(c);
            println!();
        }
    })
}

fn cmd_rules(ctx: &Session) -> anyhow::Result<()> {
    ctx.emit(&fixed_rule_set(), |rules| {
        for rule in rules.iter() {
            let state = if rule.enabled {
                "enabled".green()
            } else {
                "disabled".dimmed()
            };
            println!("{} [{}] {}", rule.id.bold(), state, rule.name);
            println!("  when {} -> {}", rule.condition, rule.outcome.to_string().cyan());
        }
    })
}

fn cmd_serve(ctx: Session, args: ServeArgs) -> anyhow::Result<()> {
    let mut server_config = ctx.config.server.clone();
    if let Some(bind) = args.bind {
        server_config.bind_addr = bind;
    }
    let ledger = ctx.open_ledger()?;
    let server = SuvidhaServer::new(server_config, Arc::new(ledger));

    println!(
        "SUVIDHA server on {} (data: {})",
        server.config().bind_addr.to_string().bold(),
        ctx.data_dir.display()
    );
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_config(ctx: &Session) -> anyhow::Result<()> {
    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ctx.config)?),
        OutputFormat::Text => print!("{}", ctx.config.to_toml()?),
    }
    Ok(())
}

fn print_block(block: &Block) {
    println!(
        "{}  {}",
        format!("#{}", block.sequence_number).yellow().bold(),
        block.digest.to_hex().dimmed()
    );
    println!("  Entity:   {}", block.payload.entity_id.bold());
    println!("  Action:   {}", block.payload.action.to_string().cyan());
    println!("  Actor:    {}", block.payload.actor);
    if !block.payload.details.is_empty() {
        println!("  Details:  {}", block.payload.details);
    }
    println!("  Time:     {}", block.created_at_millis);
    println!("  Nonce:    {}", block.nonce);
}

fn print_report(report: &VerificationReport) {
    let subject = report.entity_id.as_deref().unwrap_or("ledger");
    if report.valid {
        println!("{} {} verified", "✓".green().bold(), subject.bold());
    } else {
        println!("{} {} failed verification", "✗".red().bold(), subject.bold());
    }
    println!("  Blocks:    {}", report.block_count);
    println!("  Integrity: {}", report.integrity_score);
    if let Some(seq) = report.latest_sequence_number {
        println!("  Latest:    #{seq}");
    }
    for violation in &report.violations {
        println!(
            "  {} #{} {:?}: {}",
            "!".red(),
            violation.sequence_number,
            violation.kind,
            violation.description
        );
    }
}

fn print_certificate(c: &Certificate) {
    println!("{}  {}", "Token".bold(), c.token_id.to_hex().yellow());
    println!("  Entity:     {}", c.entity_id.bold());
    println!("  Issuer:     {} -> {}", c.issuer_id, c.recipient_id);
    println!("  Block:      {}", c.linked_block_digest.short_hex());
    println!("  Resolved:   {} ({} h)", c.resolved_at_iso, c.resolution_hours);
    println!("  Rating:     {}/5", c.rating);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use suvidha_store::KeyValueStore;

    fn run(dir: &tempfile::TempDir, args: &[&str]) -> anyhow::Result<()> {
        let mut argv = vec!["suvidha", "--data-dir", dir.path().to_str().unwrap()];
        argv.extend_from_slice(args);
        run_command(Cli::parse_from(argv))
    }

    fn ledger(dir: &tempfile::TempDir) -> Ledger<FileStore> {
        let store = FileStore::open(dir.path()).unwrap();
        Ledger::open(store, Default::default()).unwrap()
    }

    #[test]
    fn append_log_and_verify() {
        let dir = tempfile::TempDir::new().unwrap();
        run(&dir, &["append", "C-100", "created", "--details", "pothole"]).unwrap();
        run(&dir, &["append", "C-100", "RESOLVED", "--actor", "roads"]).unwrap();
        run(&dir, &["log", "C-100", "--oneline"]).unwrap();
        run(&dir, &["verify", "C-100"]).unwrap();
        run(&dir, &["--format", "json", "verify"]).unwrap();

        let blocks = ledger(&dir).transactions_for("C-100").unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].payload.details, "pothole");
        assert_eq!(blocks[1].payload.actor, "roads");
    }

    #[test]
    fn verify_fails_after_tampering() {
        let dir = tempfile::TempDir::new().unwrap();
        run(&dir, &["append", "C-1", "created"]).unwrap();
        run(&dir, &["append", "C-1", "resolved"]).unwrap();

        let ledger = ledger(&dir);
        let mut chain = ledger.all_transactions().unwrap();
        chain[1].payload.details = "edited".into();
        ledger
            .store()
            .save(
                &ledger.config().blocks_key,
                &serde_json::to_vec(&chain).unwrap(),
            )
            .unwrap();

        assert!(run(&dir, &["verify", "C-1"]).is_err());
    }

    #[test]
    fn mint_and_check_certificate() {
        let dir = tempfile::TempDir::new().unwrap();
        run(&dir, &["append", "C-7", "resolved"]).unwrap();
        run(&dir, &["mint", "C-7", "--rating", "4", "--meta", "ward=12"]).unwrap();

        let certificate = ledger(&dir).certificate_for("C-7").unwrap().unwrap();
        assert_eq!(certificate.rating, 4);
        assert_eq!(certificate.metadata["ward"], 12);

        run(&dir, &["certificate", &certificate.token_id.to_hex()]).unwrap();
        run(&dir, &["certificate", "--entity", "C-7"]).unwrap();
        assert!(run(&dir, &["mint", "C-7", "--rating", "5"]).is_err());
        assert!(run(&dir, &["certificate", &"0".repeat(64)]).is_err());
    }

    #[test]
    fn bad_metadata_pair_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(run(&dir, &["mint", "C-7", "--rating", "4", "--meta", "ward"]).is_err());
    }

    #[test]
    fn config_file_in_data_dir_applies() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(crate::config::CONFIG_FILE),
            "[ledger]\ndifficulty = 1\n",
        )
        .unwrap();
        run(&dir, &["append", "C-1", "created"]).unwrap();
        run(&dir, &["config"]).unwrap();

        let block = ledger(&dir).all_transactions().unwrap().remove(0);
        assert!(block.digest.to_hex().starts_with('0'));
    }

    #[test]
    fn read_only_commands_on_empty_ledger() {
        let dir = tempfile::TempDir::new().unwrap();
        run(&dir, &["stats"]).unwrap();
        run(&dir, &["rules"]).unwrap();
        run(&dir, &["log"]).unwrap();
        run(&dir, &["certificate"]).unwrap();
    }
}
