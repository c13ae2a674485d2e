use std::path::PathBuf;

use anyhow::Result;
use toolscope_tools::{ResolveRequest, ResourceHub, ToolParams};

use crate::boot::{self, Session};

fn request<'a>(
    session: &'a Session,
    mode: &'a str,
    model: Option<&'a toolscope_types::ModelInfo>,
) -> ResolveRequest<'a> {
    let mut req = ResolveRequest::new(mode, &session.config.settings, &session.config.experiments)
        .with_custom_modes(&session.custom_modes);
    req.model = model;
    req.resource_hub = session.resource_hub.as_ref().map(|hub| hub as &dyn ResourceHub);
    req
}

/// Print the tools presented for a mode.
pub fn run_resolve(
    session: &Session,
    mode: Option<String>,
    model: Option<PathBuf>,
    candidates: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let mode = session.mode(mode.as_deref());
    let model = boot::read_model_info(model.as_ref())?;
    let catalog = session.resolver.catalog().snapshot();
    let candidates = boot::read_candidates(candidates.as_ref(), &catalog)?;

    let req = request(session, mode, model.as_ref());
    let tools = session.resolver.resolve_available_tools(&candidates, &req);

    if json {
        println!("{}", serde_json::to_string_pretty(&tools)?);
    } else {
        for tool in &tools {
            println!("{}", tool.name);
        }
    }
    Ok(())
}

/// Report whether one tool is allowed, and why not.
///
/// Returns `false` when the tool is denied.
pub fn run_check(
    session: &Session,
    tool: String,
    mode: Option<String>,
    model: Option<PathBuf>,
    path: Option<String>,
) -> Result<bool> {
    let mode = session.mode(mode.as_deref());
    let model = boot::read_model_info(model.as_ref())?;
    let req = request(session, mode, model.as_ref());
    let resolver = &session.resolver;
    let catalog = resolver.catalog().snapshot();
    let policy = resolver.modes();

    if !resolver.is_tool_allowed_in_mode(&tool, &req) {
        let reason = match policy.check(
            &tool,
            mode,
            &session.custom_modes,
            &session.config.experiments,
            &catalog,
            None,
        ) {
            Err(e) => e.to_string(),
            Ok(()) => {
                format!("tool `{tool}` is excluded by the model or its feature is unavailable")
            }
        };
        println!("denied: {reason}");
        return Ok(false);
    }

    // Model-included opt-in tools are held to their group's restriction too.
    let params = path.map(ToolParams::with_path);
    if let Err(e) =
        policy.check_restriction(&tool, mode, &session.custom_modes, &catalog, params.as_ref())
    {
        println!("denied: {e}");
        return Ok(false);
    }

    let resolved = policy.resolve(mode, &session.custom_modes);
    println!("allowed: `{tool}` in mode `{}`", resolved.slug);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn session(dir: &Path) -> Session {
        let config = dir.join("config.json5");
        std::fs::write(&config, "{}").unwrap();
        Session::load(Some(&config), Some(dir)).unwrap()
    }

    fn model_including(dir: &Path, tools: &[&str]) -> PathBuf {
        let path = dir.join("model.json");
        let info = serde_json::json!({ "includedTools": tools });
        std::fs::write(&path, info.to_string()).unwrap();
        path
    }

    fn check(
        session: &Session,
        tool: &str,
        mode: &str,
        model: Option<&PathBuf>,
        path: Option<&str>,
    ) -> bool {
        run_check(
            session,
            tool.to_string(),
            Some(mode.to_string()),
            model.cloned(),
            path.map(str::to_string),
        )
        .unwrap()
    }

    #[test]
    fn test_check_allows_and_denies_by_group() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path());
        assert!(check(&session, "read_file", "ask", None, None));
        assert!(!check(&session, "execute_command", "ask", None, None));
        assert!(check(&session, "run_terminal_command", "code", None, None));
    }

    #[test]
    fn test_check_applies_file_restriction() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path());
        assert!(check(&session, "write_to_file", "architect", None, Some("docs/plan.md")));
        assert!(!check(&session, "write_to_file", "architect", None, Some("src/main.rs")));
    }

    #[test]
    fn test_check_restricts_model_included_opt_in_tool() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path());
        let model = model_including(dir.path(), &["edit_file"]);

        assert!(!check(&session, "edit_file", "architect", None, None));
        assert!(check(&session, "edit_file", "architect", Some(&model), None));
        assert!(check(&session, "edit_file", "architect", Some(&model), Some("docs/plan.md")));
        assert!(!check(&session, "edit_file", "architect", Some(&model), Some("src/main.rs")));
        assert!(check(&session, "edit_file", "code", Some(&model), Some("src/main.rs")));
    }

    #[test]
    fn test_check_missing_model_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path());
        let result = run_check(
            &session,
            "read_file".to_string(),
            None,
            Some(dir.path().join("missing.json")),
            None,
        );
        assert!(result.is_err());
    }
}
