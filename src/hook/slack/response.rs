//! Chat text rendering of build trigger results

use crate::hook::TransformResponseInput;

/// Shown when a response is rendered with no results at all.
pub const NO_RESULTS_TEXT: &str = "_No build was triggered._";

/// Renders all trigger results into one chat message.
///
/// The `Results:` header is written once, followed by the success, failed
/// trigger and error sections in that order. Empty sections are left out.
pub fn format_results(input: &TransformResponseInput) -> String {
    let mut lines = vec!["Results:".to_string()];

    if !input.success_trigger_responses.is_empty() {
        lines.push("*Success!* Details:".to_string());
        lines.extend(
            input
                .success_trigger_responses
                .iter()
                .map(|resp| format!("* {}", resp)),
        );
    }

    if !input.failed_trigger_responses.is_empty() {
        lines.push("*[!] Failed Triggers*:".to_string());
        lines.extend(
            input
                .failed_trigger_responses
                .iter()
                .map(|resp| format!("* {}", resp)),
        );
    }

    if !input.errors.is_empty() {
        lines.push("*[!] Errors*:".to_string());
        lines.extend(input.errors.iter().map(|err| format!("* {}", err)));
    }

    if input.is_empty() {
        lines.push(NO_RESULTS_TEXT.to_string());
    }

    lines.join("\n")
}

pub fn format_error_message(message: &str) -> String {
    format!("*[!] Error*: {}", message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::TriggerApiResponse;

    fn response(status: &str, message: &str) -> TriggerApiResponse {
        TriggerApiResponse {
            status: status.to_string(),
            message: message.to_string(),
            service: "bitrise".to_string(),
            app_slug: "app-slug".to_string(),
            build_slug: "build-slug".to_string(),
        }
    }

    #[test]
    fn single_success() {
        let input = TransformResponseInput {
            success_trigger_responses: vec![response("ok", "triggered build")],
            ..Default::default()
        };
        assert_eq!(
            format_results(&input),
            "Results:\n*Success!* Details:\n* {Status:ok Message:triggered build Service:bitrise AppSlug:app-slug BuildSlug:build-slug}"
        );
    }

    #[test]
    fn single_failed_trigger() {
        let input = TransformResponseInput {
            failed_trigger_responses: vec![response("error", "some error happened")],
            ..Default::default()
        };
        assert_eq!(
            format_results(&input),
            "Results:\n*[!] Failed Triggers*:\n* {Status:error Message:some error happened Service:bitrise AppSlug:app-slug BuildSlug:build-slug}"
        );
    }

    #[test]
    fn multiple_errors() {
        let input = TransformResponseInput {
            errors: vec!["first error".to_string(), "Second Error".to_string()],
            ..Default::default()
        };
        assert_eq!(
            format_results(&input),
            "Results:\n*[!] Errors*:\n* first error\n* Second Error"
        );
    }

    #[test]
    fn all_sections_in_order() {
        let input = TransformResponseInput {
            success_trigger_responses: vec![response("ok", "triggered build")],
            failed_trigger_responses: vec![response("error", "no such branch")],
            errors: vec!["connection refused".to_string()],
        };
        let text = format_results(&input);
        assert_eq!(
            text,
            "Results:\n\
             *Success!* Details:\n\
             * {Status:ok Message:triggered build Service:bitrise AppSlug:app-slug BuildSlug:build-slug}\n\
             *[!] Failed Triggers*:\n\
             * {Status:error Message:no such branch Service:bitrise AppSlug:app-slug BuildSlug:build-slug}\n\
             *[!] Errors*:\n\
             * connection refused"
        );
        assert_eq!(text.matches("Results:").count(), 1);
    }

    #[test]
    fn empty_input() {
        let text = format_results(&TransformResponseInput::default());
        assert_eq!(text, "Results:\n_No build was triggered._");
    }

    #[test]
    fn error_message() {
        assert_eq!(format_error_message("my Err msg"), "*[!] Error*: my Err msg");
    }
}
