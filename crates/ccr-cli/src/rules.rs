//! # Rules Subcommand
//!
//! Rule configuration against the live catalog.
//!
//! ## Subcommands
//!
//! - `list` — Show every category with its rules and selection marks.
//! - `toggle` — Flip one or more codes in the selection set.
//! - `select-all` / `deselect-all` — Bulk selection for one category.
//! - `save` — Push one activation per catalog rule to the rules service.
//! - `edit` — Change one rule's description or severity on the service.
//!
//! Selection changes are stored locally; only `save` and `edit` write to
//! the service.

use anyhow::{bail, Result};
use ccr_catalog::RuleCatalog;
use ccr_client::ReviewClient;
use ccr_core::{RuleCategory, SessionStore, Severity};
use clap::{Args, Subcommand};

use crate::session::ReviewSession;
use crate::{block_on, sign_out_if_unauthorized, Context, EXIT_PARTIAL_FAILURE};

/// Arguments for the `ccr rules` subcommand.
#[derive(Args, Debug)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub command: RulesCommand,
}

/// Rules subcommands.
#[derive(Subcommand, Debug)]
pub enum RulesCommand {
    /// List rules by category.
    List {
        /// Show only this category.
        #[arg(long)]
        category: Option<RuleCategory>,
    },

    /// Flip each code between active and inactive.
    Toggle {
        /// Rule codes (e.g. "LO1001.03").
        #[arg(required = true)]
        codes: Vec<String>,
    },

    /// Mark every rule in a category active.
    SelectAll {
        /// identification, communication, policy or system.
        category: RuleCategory,
    },

    /// Mark every rule in a category inactive.
    DeselectAll {
        /// identification, communication, policy or system.
        category: RuleCategory,
    },

    /// Save the active/inactive state of every rule to the service.
    Save,

    /// Change a rule's description or severity.
    Edit {
        /// Rule code (e.g. "LO1001.03").
        code: String,

        /// New description.
        #[arg(long)]
        desc: Option<String>,

        /// New severity: major, moderate or minor.
        #[arg(long)]
        severity: Option<Severity>,
    },
}

/// Execute the rules subcommand.
pub fn run_rules(args: &RulesArgs, ctx: &Context) -> Result<u8> {
    let mut session = ctx.open_session()?;

    if let RulesCommand::Toggle { codes } = &args.command {
        if !session.is_authenticated() {
            bail!("not signed in; run `ccr login` first");
        }
        return cmd_toggle(&mut session, codes);
    }

    let client = ctx.client(&session)?;
    block_on(async {
        refresh(&client, &mut session).await?;
        match &args.command {
            RulesCommand::List { category } => cmd_list(session.catalog(), *category),
            RulesCommand::SelectAll { category } => cmd_select(&mut session, *category, true),
            RulesCommand::DeselectAll { category } => cmd_select(&mut session, *category, false),
            RulesCommand::Save => cmd_save(&client, &mut session).await,
            RulesCommand::Edit { code, desc, severity } => {
                cmd_edit(&client, &mut session, code, desc.as_deref(), *severity).await
            }
            RulesCommand::Toggle { .. } => Ok(0),
        }
    })?
}

async fn refresh<S: SessionStore>(client: &ReviewClient, session: &mut ReviewSession<S>) -> Result<()> {
    if let Err(e) = client.rules().refresh(session.catalog_mut()).await {
        return Err(sign_out_if_unauthorized(session, e));
    }
    Ok(())
}

fn cmd_toggle<S: SessionStore>(session: &mut ReviewSession<S>, codes: &[String]) -> Result<u8> {
    for code in codes {
        session.catalog_mut().toggle(code);
        let state = if session.catalog().is_selected(code) { "active" } else { "inactive" };
        println!("OK: {code} is now {state}");
    }
    session.persist_selection()?;
    Ok(0)
}

fn cmd_select<S: SessionStore>(
    session: &mut ReviewSession<S>,
    category: RuleCategory,
    active: bool,
) -> Result<u8> {
    if active {
        session.catalog_mut().select_all(category);
    } else {
        session.catalog_mut().deselect_all(category);
    }
    session.persist_selection()?;

    let (selected, total) = session.catalog().category_counts(category);
    println!("OK: {} {selected}/{total} active", category.title());
    Ok(0)
}

fn cmd_list(catalog: &RuleCatalog, only: Option<RuleCategory>) -> Result<u8> {
    if catalog.count_total() == 0 {
        println!("No rules available.");
        return Ok(0);
    }

    for &category in RuleCategory::all() {
        if only.is_some_and(|c| c != category) {
            continue;
        }
        let (selected, total) = catalog.category_counts(category);
        println!("{} [{selected}/{total}]", category.title());
        for rule in catalog.rules(category) {
            let mark = if catalog.is_selected(&rule.code) { "x" } else { " " };
            println!(
                "  [{mark}] {:<10} {:<8} {}",
                rule.code,
                rule.severity.as_str(),
                rule.description
            );
        }
    }

    println!(
        "Active: {} of {} ({} inactive)",
        catalog.count_selected(),
        catalog.count_total(),
        catalog.inactive_count()
    );
    Ok(0)
}

async fn cmd_save<S: SessionStore>(client: &ReviewClient, session: &mut ReviewSession<S>) -> Result<u8> {
    if session.catalog().count_total() == 0 {
        println!("No rules to save.");
        return Ok(0);
    }

    let report = client.rules().save_catalog(session.catalog()).await;
    session.persist_selection()?;

    for outcome in report.failed() {
        println!(
            "FAIL: {} ({}): {}",
            outcome.code,
            if outcome.active { "active" } else { "inactive" },
            outcome.error.as_deref().unwrap_or_default()
        );
    }

    if report.all_succeeded() {
        println!(
            "OK: saved {} rules ({} active, {} inactive)",
            report.outcomes.len(),
            report.active_count(),
            report.inactive_count()
        );
        Ok(0)
    } else {
        println!(
            "FAIL: {} of {} rules were not saved",
            report.failed_count(),
            report.outcomes.len()
        );
        Ok(EXIT_PARTIAL_FAILURE)
    }
}

async fn cmd_edit<S: SessionStore>(
    client: &ReviewClient,
    session: &mut ReviewSession<S>,
    code: &str,
    desc: Option<&str>,
    severity: Option<Severity>,
) -> Result<u8> {
    if desc.is_none() && severity.is_none() {
        bail!("nothing to change; pass --desc and/or --severity");
    }
    let catalog = session.catalog_mut();
    if let Some(desc) = desc {
        catalog.set_description(code, desc);
    }
    if let Some(severity) = severity {
        catalog.set_severity(code, severity);
    }

    let modified_by = session.user().map_or(DEFAULT_EDITOR, |u| u.username.as_str());
    let Some(edit) = session
        .catalog()
        .edit_for_persist(code, modified_by, chrono::Utc::now())
    else {
        bail!("no rule with code {code}");
    };

    if let Err(e) = client.rules().update_rule(&edit).await {
        return Err(sign_out_if_unauthorized(session, e));
    }
    println!("OK: {code} updated ({}, {})", edit.severity, edit.description);
    Ok(0)
}

/// Recorded as the editor when the token came from the environment.
const DEFAULT_EDITOR: &str = "ccr";
