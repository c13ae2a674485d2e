//! Canonical built-in tool and group identifiers.

// read
pub const READ_FILE: &str = "read_file";
pub const FETCH_INSTRUCTIONS: &str = "fetch_instructions";
pub const SEARCH_FILES: &str = "search_files";
pub const LIST_FILES: &str = "list_files";
pub const CODEBASE_SEARCH: &str = "codebase_search";

// edit
pub const APPLY_DIFF: &str = "apply_diff";
pub const WRITE_TO_FILE: &str = "write_to_file";
pub const GENERATE_IMAGE: &str = "generate_image";
pub const SEARCH_AND_REPLACE: &str = "search_and_replace";
pub const EDIT_FILE: &str = "edit_file";
pub const APPLY_PATCH: &str = "apply_patch";

// browser
pub const BROWSER_ACTION: &str = "browser_action";

// command
pub const EXECUTE_COMMAND: &str = "execute_command";

// mcp
pub const USE_MCP_TOOL: &str = "use_mcp_tool";
pub const ACCESS_MCP_RESOURCE: &str = "access_mcp_resource";

// modes
pub const SWITCH_MODE: &str = "switch_mode";
pub const NEW_TASK: &str = "new_task";

// always available
pub const ASK_FOLLOWUP_QUESTION: &str = "ask_followup_question";
pub const ATTEMPT_COMPLETION: &str = "attempt_completion";
pub const UPDATE_TODO_LIST: &str = "update_todo_list";
pub const RUN_SLASH_COMMAND: &str = "run_slash_command";

pub mod groups {
    pub const READ: &str = "read";
    pub const EDIT: &str = "edit";
    pub const BROWSER: &str = "browser";
    pub const COMMAND: &str = "command";
    pub const MCP: &str = "mcp";
    pub const MODES: &str = "modes";
}
