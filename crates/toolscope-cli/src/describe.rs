use anyhow::Result;
use toolscope_tools::{ModePolicy, ResolveRequest};

use crate::boot::Session;

/// List built-in and custom modes with their groups.
pub fn run_modes(session: &Session) -> Result<()> {
    let policy = session.resolver.modes();
    for mode in policy.all_modes(&session.custom_modes) {
        let marker = if mode.slug == policy.default_slug() { "*" } else { " " };
        let groups = ModePolicy::group_names(mode);
        let groups = if groups.is_empty() {
            "-".to_string()
        } else {
            groups.join(", ")
        };
        println!("{marker} {:<14} {:<16} {groups}", mode.slug, mode.name);
    }
    Ok(())
}

/// Print the tools each permitted group contributes to a mode.
pub fn run_describe(session: &Session, mode: Option<String>) -> Result<()> {
    let mode = session.mode(mode.as_deref());
    let mut req = ResolveRequest::new(mode, &session.config.settings, &session.config.experiments)
        .with_custom_modes(&session.custom_modes);
    if let Some(hub) = session.resource_hub.as_ref() {
        req = req.with_resource_hub(hub);
    }

    let resolved = session.resolver.modes().resolve(mode, &session.custom_modes);
    println!("Mode: {} ({})", resolved.name, resolved.slug);
    if let Some(when) = &resolved.when_to_use {
        println!("  {when}");
    }
    for summary in session.resolver.mode_summary(&req) {
        match &summary.restriction {
            Some(restriction) => println!("  {} [{restriction}]", summary.group),
            None => println!("  {}", summary.group),
        }
        for tool in &summary.tools {
            println!("    - {tool}");
        }
    }
    Ok(())
}
