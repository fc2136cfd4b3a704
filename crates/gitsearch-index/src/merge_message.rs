//! Classification of merge commit messages

/// Prefix the hosting system uses when it merges a pull request
pub const MERGE_PR_PREFIX: &str = "Merge pull request #";

const PR_TERMINATOR: &str = " in ";

/// Extracts the pull request number from a PR-landing merge message.
///
/// `"Merge pull request #42 in proj/repo"` yields `"42"`. Any other message,
/// including one with the prefix but no `" in "` after it, yields an empty
/// string.
pub fn extract_pr_number(message: &str) -> String {
    let Some(rest) = message.strip_prefix(MERGE_PR_PREFIX) else {
        return String::new();
    };

    match rest.find(PR_TERMINATOR) {
        Some(end) => rest[..end].trim().to_string(),
        None => {
            log::debug!("Merge message without PR terminator: {:?}", first_line(message));
            String::new()
        }
    }
}

/// True for merges that fold one already-landed branch into another
/// ("Merge branch 'main' into feature") and carry no new PR work.
pub fn is_integration_merge(message: &str) -> bool {
    message.contains("Merge") && message.contains("into")
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_pr_number() {
        assert_eq!(extract_pr_number("Merge pull request #42 in proj/repo"), "42");
    }

    #[test]
    fn test_extracts_pr_number_from_multiline_message() {
        let message = "Merge pull request #1187 in CORE/lms from feature/x to main\n\n* commit 'abc':\n  Fix";
        assert_eq!(extract_pr_number(message), "1187");
    }

    #[test]
    fn test_trims_whitespace_around_number() {
        assert_eq!(extract_pr_number("Merge pull request # 7  in proj/repo"), "7");
    }

    #[test]
    fn test_prefix_must_start_the_message() {
        assert_eq!(extract_pr_number("Revert \"Merge pull request #42 in proj/repo\""), "");
    }

    #[test]
    fn test_missing_terminator_yields_empty() {
        assert_eq!(extract_pr_number("Merge pull request #42 from user/branch"), "");
    }

    #[test]
    fn test_terminator_is_searched_after_prefix() {
        // The first " in " after the prefix ends the number
        assert_eq!(extract_pr_number("Merge pull request #9 in a in b"), "9");
    }

    #[test]
    fn test_regular_message_yields_empty() {
        assert_eq!(extract_pr_number("Fix walker termination"), "");
        assert_eq!(extract_pr_number(""), "");
    }

    #[test]
    fn test_integration_merge_detection() {
        assert!(is_integration_merge("Merge branch 'main' into feature/x"));
        assert!(is_integration_merge("Merge remote-tracking branch 'origin/main' into main"));
        assert!(!is_integration_merge("Merge pull request #42 in proj/repo"));
        assert!(!is_integration_merge("Move code into module"));
        assert!(!is_integration_merge("merge branch main into feature"));
    }
}
