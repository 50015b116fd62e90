//! Tool lookup and execution.

use tracing::debug;

use crate::context::ToolContext;
use crate::definition::ToolDefinition;
use crate::errors::{ToolError, ToolResult};

/// Find a tool by exact name.
#[must_use]
pub fn find_tool<'a>(tools: &'a [ToolDefinition], name: &str) -> Option<&'a ToolDefinition> {
    tools.iter().find(|t| t.name == name)
}

/// Run the handler of the tool named `name` with the raw `arguments` string.
///
/// Handler errors are returned unchanged; an unknown name yields
/// [`ToolError::NotFound`].
pub fn invoke_tool(
    ctx: &ToolContext,
    tools: &[ToolDefinition],
    name: &str,
    arguments: &str,
) -> ToolResult<String> {
    let tool = find_tool(tools, name).ok_or_else(|| ToolError::not_found(name))?;

    debug!(
        tool = %name,
        call_id = ctx.tool_call_id.as_deref().unwrap_or_default(),
        run_id = %ctx.run_id,
        "Invoking tool"
    );

    tool.call(ctx, arguments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tools() -> Vec<ToolDefinition> {
        vec![
            ToolDefinition::new("upper", |_ctx, args| Ok(args.to_uppercase())),
            ToolDefinition::new("fail", |_ctx, _args| {
                Err(ToolError::execution_failed("service unavailable"))
            }),
            ToolDefinition::new("whoami", |ctx, _args| {
                Ok(ctx.tool_call_id.clone().unwrap_or_default())
            }),
        ]
    }

    #[rstest]
    #[case("upper", "abc", "ABC")]
    #[case("upper", "", "")]
    #[case("whoami", "{}", "call_7")]
    fn test_invoke_matching_tool(#[case] name: &str, #[case] args: &str, #[case] expected: &str) {
        let ctx = ToolContext::new("qwen-plus").for_call(name, "call_7");
        assert_eq!(invoke_tool(&ctx, &tools(), name, args).unwrap(), expected);
    }

    #[rstest]
    #[case("missing")]
    #[case("Upper")]
    #[case("")]
    fn test_unknown_name(#[case] name: &str) {
        let ctx = ToolContext::new("qwen-plus");
        let err = invoke_tool(&ctx, &tools(), name, "{}").unwrap_err();
        assert!(matches!(err, ToolError::NotFound(ref n) if n == name));
    }

    #[test]
    fn test_handler_error_propagates() {
        let ctx = ToolContext::new("qwen-plus");
        let err = invoke_tool(&ctx, &tools(), "fail", "{}").unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed(ref m) if m == "service unavailable"));
    }

    #[test]
    fn test_empty_tool_set() {
        let ctx = ToolContext::new("qwen-plus");
        assert!(invoke_tool(&ctx, &[], "upper", "x").unwrap_err().is_not_found());
        assert!(find_tool(&[], "upper").is_none());
    }
}
