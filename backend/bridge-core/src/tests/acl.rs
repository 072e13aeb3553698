// Unit tests for the permission manager, scope patterns, and extraction.

use crate::acl::{Decision, PermissionManager, ScopePattern, extract_scopes, is_plugin_command};

use models::acl::{AclConfig, Capability, Permission, Policy};

use serde_json::json;

fn config_with(capabilities: Vec<Capability>, permissions: Vec<Permission>) -> AclConfig {
    AclConfig {
        capabilities,
        permissions,
        default_app_policy: Policy::Allow,
        default_plugin_policy: Policy::Deny,
    }
}

fn permission(name: &str, command: &str, scopes: &[&str]) -> Permission {
    Permission {
        name: name.to_string(),
        command: command.to_string(),
        scopes: scopes.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn given_glob_pattern_when_matched_then_star_stays_within_segment() {
    let pattern = ScopePattern::compile("/data/*.txt").expect("compiles");

    assert!(pattern.matches("/data/notes.txt"));
    assert!(!pattern.matches("/data/sub/notes.txt"));
    assert!(!pattern.matches("/data/notes.json"));
}

#[test]
fn given_double_star_pattern_when_matched_then_crosses_separators() {
    let pattern = ScopePattern::compile("/data/**/*.txt").expect("compiles");

    assert!(pattern.matches("/data/notes.txt"));
    assert!(pattern.matches("/data/a/b/notes.txt"));
    assert!(!pattern.matches("/var/notes.txt"));
}

#[test]
fn given_question_mark_when_matched_then_single_character() {
    let pattern = ScopePattern::compile("report-?.csv").expect("compiles");

    assert!(pattern.matches("report-1.csv"));
    assert!(!pattern.matches("report-10.csv"));
}

/// **VALUE**: Verifies `$HOME` expands to the platform home directory.
///
/// **WHY THIS MATTERS**: Capability files ship with portable patterns like
/// `$HOME/docs/**`; without expansion they would never match an absolute
/// path extracted from a request, silently denying everything they were
/// meant to allow.
///
/// **BUG THIS CATCHES**: Would catch expansion happening after glob
/// translation (escaping the `$`) or not at all.
#[test]
fn given_home_variable_when_compiled_then_matches_absolute_paths() {
    let Some(home) = dirs::home_dir() else {
        return; // No home on this platform - nothing to verify
    };

    let pattern = ScopePattern::compile("$HOME/docs/**").expect("compiles");

    let inside = format!("{}/docs/a/b.txt", home.display());
    let outside = "/etc/passwd";
    assert!(pattern.matches(&inside));
    assert!(!pattern.matches(outside));
}

#[test]
fn given_unknown_variable_when_compiled_then_error() {
    let result = ScopePattern::compile("$BOGUS/docs/**");

    assert!(result.is_err(), "Unknown path variables must be rejected");
}

#[test]
fn given_body_with_known_keys_when_extracted_then_scope_values_collected() {
    let body = json!({
        "path": "/tmp/a.txt",
        "count": 3,
        "options": { "dir": "/tmp/out" },
        "files": ["/tmp/b.txt", "/tmp/c.txt"],
    });

    let mut scopes = extract_scopes(&body);
    scopes.sort();

    assert_eq!(
        scopes,
        vec!["/tmp/a.txt", "/tmp/b.txt", "/tmp/c.txt", "/tmp/out"]
    );
}

#[test]
fn given_non_object_body_when_extracted_then_no_scopes() {
    assert!(extract_scopes(&json!("just a string")).is_empty());
    assert!(extract_scopes(&json!([1, 2, 3])).is_empty());
}

#[test]
fn given_command_names_when_classified_then_separator_marks_plugins() {
    assert!(is_plugin_command("fs.read"));
    assert!(!is_plugin_command("read"));
}

/// **VALUE**: Verifies a single matching grant allows a plugin command.
///
/// **WHY THIS MATTERS**: Default-deny plus explicit capability is the
/// entire security model for plugin commands. Grant evaluation that never
/// matches locks plugins out; evaluation that over-matches defeats the gate.
///
/// **BUG THIS CATCHES**: Would catch target/label mismatches and command
/// glob patterns failing against namespaced names.
#[test]
fn given_matching_capability_when_checked_then_plugin_command_allowed() {
    let manager = PermissionManager::new();
    manager
        .configure(config_with(
            vec![
                Capability::builder("main-fs")
                    .for_target("main")
                    .with_permission("fs-read")
                    .build()
                    .expect("capability"),
            ],
            vec![permission("fs-read", "fs.read", &[])],
        ))
        .expect("configure");

    assert!(manager.check("fs.read", "main", &[]).is_allowed());
}

#[test]
fn given_capability_for_other_view_when_checked_then_default_deny_applies() {
    let manager = PermissionManager::new();
    manager
        .configure(config_with(
            vec![
                Capability::builder("settings-fs")
                    .for_target("settings")
                    .with_permission("fs-read")
                    .build()
                    .expect("capability"),
            ],
            vec![permission("fs-read", "fs.read", &[])],
        ))
        .expect("configure");

    let decision = manager.check("fs.read", "main", &[]);
    assert!(matches!(decision, Decision::Deny { .. }));
}

#[test]
fn given_command_glob_permission_when_checked_then_pattern_matches_family() {
    let manager = PermissionManager::new();
    manager
        .configure(config_with(
            vec![
                Capability::builder("all-fs")
                    .for_all_targets()
                    .with_permission("fs-any")
                    .build()
                    .expect("capability"),
            ],
            vec![permission("fs-any", "fs.*", &[])],
        ))
        .expect("configure");

    assert!(manager.check("fs.read", "main", &[]).is_allowed());
    assert!(manager.check("fs.write", "main", &[]).is_allowed());
    assert!(!manager.check("net.fetch", "main", &[]).is_allowed());
}

/// **VALUE**: Verifies scope restrictions bind the values a grant covers.
///
/// **WHY THIS MATTERS**: A permission scoped to `/tmp/**` that also allows
/// `/etc/passwd` is a sandbox escape, not a convenience.
///
/// **BUG THIS CATCHES**: Would catch "any scope matches" logic where every
/// extracted value must satisfy the pattern set.
#[test]
fn given_scoped_permission_when_value_outside_scope_then_denied() {
    let manager = PermissionManager::new();
    manager
        .configure(config_with(
            vec![
                Capability::builder("tmp-only")
                    .for_all_targets()
                    .with_permission("fs-tmp")
                    .build()
                    .expect("capability"),
            ],
            vec![permission("fs-tmp", "fs.read", &["/tmp/**"])],
        ))
        .expect("configure");

    let inside = vec![String::from("/tmp/ok.txt")];
    let outside = vec![String::from("/tmp/ok.txt"), String::from("/etc/passwd")];

    assert!(manager.check("fs.read", "main", &inside).is_allowed());
    assert!(!manager.check("fs.read", "main", &outside).is_allowed());
}

#[test]
fn given_reconfigure_when_checked_then_prior_state_replaced_wholesale() {
    let manager = PermissionManager::new();
    manager
        .configure(config_with(
            vec![
                Capability::builder("main-fs")
                    .for_target("main")
                    .with_permission("fs-read")
                    .build()
                    .expect("capability"),
            ],
            vec![permission("fs-read", "fs.read", &[])],
        ))
        .expect("first configure");

    // Reconfigure with no capabilities at all
    manager
        .configure(AclConfig::default())
        .expect("second configure");

    assert!(!manager.check("fs.read", "main", &[]).is_allowed());
}
