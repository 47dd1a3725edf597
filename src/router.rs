//! Utterance router: picks the topic dialog and entity for a message.
//!
//! Runs only when no prompt is waiting for a reply. Rules are evaluated in
//! order and the first match wins, so specific phrasings sit above the
//! catch-all topic rules:
//! - `cancel`/`quit`/`stop` → cancel everything
//! - `help` → main menu
//! - menu entries and keywords → `Route::Topic`

use regex::Regex;
use tracing::debug;

use crate::topics::{assignment, correction, login, names, report};

/// Where an utterance should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Start `dialog` with `entity` written into the profile.
    Topic {
        dialog: String,
        entity: Option<String>,
    },
    /// Cancel every running dialog.
    Cancel,
    /// Show the main menu.
    Help,
}

impl Route {
    pub fn topic(dialog: &str, entity: Option<&str>) -> Self {
        Self::Topic {
            dialog: dialog.to_string(),
            entity: entity.map(String::from),
        }
    }
}

/// A single routing rule with a compiled regex.
#[derive(Debug, Clone)]
pub struct RouteRule {
    /// Source pattern, kept for logging.
    pub pattern: String,
    pub regex: Regex,
    pub route: Route,
}

impl RouteRule {
    pub fn new(pattern: &str, route: Route) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: pattern.into(),
            regex: Regex::new(pattern)?,
            route,
        })
    }
}

/// Ordered rule table.
#[derive(Debug, Clone)]
pub struct Router {
    interruptions: Vec<RouteRule>,
    rules: Vec<RouteRule>,
}

impl Default for Router {
    fn default() -> Self {
        Self::default_rules()
    }
}

impl Router {
    /// Router with the helpdesk's built-in rules.
    pub fn default_rules() -> Self {
        let interruptions = vec![
            rule(r"(?i)^\s*(cancel|quit|stop)\b", Route::Cancel),
            rule(r"(?i)^\s*help\b", Route::Help),
        ];

        let rules = vec![
            // Supervisor cycle and the login variant of the same error
            rule(
                r"(?i)transaction\s+not\s+(successfully\s+)?started",
                Route::topic(names::LOGIN, Some(login::TRANSACTION)),
            ),
            rule(
                r"(?i)supervisor\s+cycle|own\s+supervisor",
                Route::topic(names::TRANSACTION, None),
            ),
            // Assignment
            rule(
                r"(?i)assign.*\bdisabled\b|\bdisabled\b.*assign",
                Route::topic(names::ASSIGNMENT, Some(assignment::DISABLED)),
            ),
            rule(
                r"(?i)not\s+visible|model\s+year|project\s+type",
                Route::topic(names::ASSIGNMENT, Some(assignment::VISIBLE)),
            ),
            // Login
            rule(
                r"(?i)not\s+authori[sz]ed|loc\s*/\s*dept",
                Route::topic(names::LOGIN, Some(login::UNAUTHORIZED)),
            ),
            rule(r"(?i)\bldap\b", Route::topic(names::LOGIN, Some(login::LDAP))),
            rule(
                r"(?i)\binvalid\b.*(user\s*id|password)|wrong\s+password",
                Route::topic(names::LOGIN, Some(login::INVALID)),
            ),
            rule(
                r"(?i)\bdeactivated\b",
                Route::topic(names::LOGIN, Some(login::DEACTIVATED)),
            ),
            // Reports
            rule(r"(?i)\bbirt\b", Route::topic(names::REPORT, Some(report::BIRT))),
            rule(
                r"(?i)\bqlik\s?view\b",
                Route::topic(names::REPORT, Some(report::QLIKVIEW)),
            ),
            rule(
                r"(?i)\bqlik\s?sense\b",
                Route::topic(names::REPORT, Some(report::QLIKSENSE)),
            ),
            // Approver corrections
            rule(
                r"(?i)backup\s+approver",
                Route::topic(names::CORRECTION, Some(correction::BACKUP_APPROVER)),
            ),
            rule(
                r"(?i)\bsupervisor\b",
                Route::topic(names::CORRECTION, Some(correction::SUPERVISOR)),
            ),
            rule(
                r"(?i)\bapprover\b",
                Route::topic(names::CORRECTION, Some(correction::APPROVER)),
            ),
            // Topic menus without a category
            rule(r"(?i)\blog\s?in\b", Route::topic(names::LOGIN, None)),
            rule(r"(?i)\breports?\b", Route::topic(names::REPORT, None)),
            rule(r"(?i)\bassign|\bproject\b", Route::topic(names::ASSIGNMENT, None)),
            rule(
                r"(?i)^\s*(hi|hello|hey|good\s+(morning|afternoon|evening))\b",
                Route::topic(names::GREETING, None),
            ),
        ];

        Self {
            interruptions,
            rules,
        }
    }

    /// Router with no rules (for testing).
    pub fn empty() -> Self {
        Self {
            interruptions: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Append a topic rule after the existing ones.
    pub fn add_rule(
        &mut self,
        pattern: &str,
        dialog: &str,
        entity: Option<&str>,
    ) -> Result<(), regex::Error> {
        self.rules
            .push(RouteRule::new(pattern, Route::topic(dialog, entity))?);
        Ok(())
    }

    /// Check only the interruption rules. These apply even while a prompt
    /// is waiting.
    pub fn interruption(&self, text: &str) -> Option<Route> {
        first_match(&self.interruptions, text)
    }

    /// Full classification: interruptions first, then topic rules.
    pub fn classify(&self, text: &str) -> Option<Route> {
        let route = self
            .interruption(text)
            .or_else(|| first_match(&self.rules, text));
        if route.is_none() {
            debug!(text, "No route matched");
        }
        route
    }
}

fn first_match(rules: &[RouteRule], text: &str) -> Option<Route> {
    rules.iter().find(|r| r.regex.is_match(text)).map(|r| {
        debug!(pattern = %r.pattern, "Route matched");
        r.route.clone()
    })
}

/// Built-in patterns are literals; a bad one is a programming error.
fn rule(pattern: &str, route: Route) -> RouteRule {
    RouteRule::new(pattern, route).expect("built-in route pattern must compile")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topics::greeting::MAIN_MENU;

    fn topic(router: &Router, text: &str) -> (String, Option<String>) {
        match router.classify(text) {
            Some(Route::Topic { dialog, entity }) => (dialog, entity),
            other => panic!("{text:?} routed to {other:?}"),
        }
    }

    #[test]
    fn interruptions_win() {
        let router = Router::default_rules();
        assert_eq!(router.classify("cancel"), Some(Route::Cancel));
        assert_eq!(router.classify("  Quit please"), Some(Route::Cancel));
        assert_eq!(router.classify("STOP"), Some(Route::Cancel));
        assert_eq!(router.classify("help"), Some(Route::Help));
        assert_eq!(router.interruption("my birt report"), None);
    }

    #[test]
    fn topic_menu_entries_route_back_to_their_category() {
        let router = Router::default_rules();
        let cases = [
            (assignment::MENU[0], names::ASSIGNMENT, Some(assignment::DISABLED)),
            (assignment::MENU[1], names::ASSIGNMENT, Some(assignment::VISIBLE)),
            (login::MENU[0], names::LOGIN, Some(login::INVALID)),
            (login::MENU[1], names::LOGIN, Some(login::LDAP)),
            (login::MENU[2], names::LOGIN, Some(login::UNAUTHORIZED)),
            (login::MENU[3], names::LOGIN, Some(login::DEACTIVATED)),
            (login::MENU[4], names::LOGIN, Some(login::TRANSACTION)),
            (report::MENU[0], names::REPORT, Some(report::QLIKVIEW)),
            (report::MENU[1], names::REPORT, Some(report::BIRT)),
            (report::MENU[2], names::REPORT, Some(report::QLIKSENSE)),
            (correction::MENU[0], names::CORRECTION, Some(correction::SUPERVISOR)),
            (
                correction::MENU[1],
                names::CORRECTION,
                Some(correction::BACKUP_APPROVER),
            ),
        ];
        for (text, dialog, entity) in cases {
            assert_eq!(
                topic(&router, text),
                (dialog.to_string(), entity.map(String::from)),
                "{text}"
            );
        }
    }

    #[test]
    fn main_menu_entries_route_to_topics() {
        let router = Router::default_rules();
        let dialogs: Vec<String> = MAIN_MENU.iter().map(|t| topic(&router, t).0).collect();
        assert_eq!(
            dialogs,
            vec![
                names::LOGIN,
                names::ASSIGNMENT,
                names::REPORT,
                names::CORRECTION,
                names::TRANSACTION,
            ]
        );
    }

    #[test]
    fn free_text_keywords() {
        let router = Router::default_rules();
        assert_eq!(
            topic(&router, "I get an LDAP error"),
            (names::LOGIN.to_string(), Some(login::LDAP.to_string()))
        );
        assert_eq!(
            topic(&router, "Qlik Sense shows old numbers"),
            (names::REPORT.to_string(), Some(report::QLIKSENSE.to_string()))
        );
        assert_eq!(topic(&router, "hello there").0, names::GREETING);
        assert_eq!(router.classify("what's the weather"), None);
    }

    #[test]
    fn custom_rules_append_after_defaults() {
        let mut router = Router::empty();
        assert_eq!(router.classify("birt"), None);
        router
            .add_rule(r"(?i)printer", names::GREETING, None)
            .unwrap();
        assert_eq!(topic(&router, "Printer broken").0, names::GREETING);
        assert!(router.add_rule("(", names::GREETING, None).is_err());
    }
}
