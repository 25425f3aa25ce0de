//! Engine-level guarantees: idempotence, order independence for disjoint
//! rules, conflict handling and preservation of untouched text.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use reforge_core::frontend::JavaFrontend;
use reforge_core::rules::{DeadCodeElimination, TestNGAssert};
use reforge_core::{
    EditRejection, NodeKind, NodeRef, RefactoringRule, Refactorer, RuleContext, RunStatus,
    SyntaxKind, Visit,
};

const DOCUMENTS: &[&str] = &[
    "if (true) { foo(); } else { bar(); }",
    "before();\nwhile (false) { doWork(); }\nafter();\n",
    "import static org.testng.Assert.*;\nassertTrue(a.equals(b));\nif (x == null) fail();\n",
    "r = (a) && (b instanceof T) && x != false;",
    "if (!(a != null && a.equals(b))) { }",
];

#[test]
fn test_output_is_a_fixpoint() -> anyhow::Result<()> {
    let frontend = JavaFrontend::new();
    for document in DOCUMENTS {
        let first = Refactorer::with_catalog().run(&frontend, document)?;
        assert_eq!(first.status, RunStatus::Converged, "{document}");

        let second = Refactorer::with_catalog().run(&frontend, &first.text)?;
        assert_eq!(second.iterations, 0, "{document}");
        assert_eq!(second.text, first.text);
        assert!(second.rules_applied().is_empty());
    }
    Ok(())
}

#[test]
fn test_disjoint_rules_commute() -> anyhow::Result<()> {
    let source = "import static org.testng.Assert.*;\nwhile (false) { spin(); }\nassertTrue(a.equals(b));\nif (true) { go(); }\n";
    let frontend = JavaFrontend::new();

    let forward = Refactorer::new()
        .add_rule(DeadCodeElimination)
        .add_rule(TestNGAssert)
        .run(&frontend, source)?;
    let backward = Refactorer::new()
        .add_rule(TestNGAssert)
        .add_rule(DeadCodeElimination)
        .run(&frontend, source)?;

    assert_eq!(
        forward.text,
        "import static org.testng.Assert.*;\nassertEquals(a, b);\ngo();\n"
    );
    assert_eq!(backward.text, forward.text);
    assert_eq!(backward.iterations, forward.iterations);
    assert!(forward.rejections.is_empty() && backward.rejections.is_empty());
    Ok(())
}

/// Statement that calls `name()` without arguments.
fn calls(node: NodeRef<'_>, name: &str) -> bool {
    match node.kind() {
        NodeKind::ExpressionStatement { expression } => {
            matches!(node.at(*expression).kind(), NodeKind::MethodCall { name: n, .. } if n == name)
        }
        _ => false,
    }
}

fn find_call<'t>(anchor: NodeRef<'t>, name: &str) -> Option<NodeRef<'t>> {
    let tree = anchor.tree();
    tree.descendants(tree.root_id())
        .into_iter()
        .map(|id| tree.node(id))
        .find(|node| matches!(node.kind(), NodeKind::MethodCall { name: n, .. } if n == name))
}

/// While visiting `trigger();`, replaces the `b()` call elsewhere in the
/// document with `replacement()`.
struct RetargetB {
    name: &'static str,
    trigger: &'static str,
    replacement: &'static str,
}

impl RefactoringRule for RetargetB {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        "rewrites the b() call from a distance"
    }

    fn interests(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::ExpressionStatement]
    }

    fn visit(&self, node: NodeRef<'_>, cx: &mut RuleContext<'_>) -> Visit {
        if !calls(node, self.trigger) {
            return Visit::Descend;
        }
        match find_call(node, "b") {
            Some(target) => {
                let replacement = self.replacement;
                cx.replace_with(target, |b| b.call(None, replacement, Vec::new()))
            }
            None => Visit::Descend,
        }
    }
}

/// Removes every `b();` statement.
struct DropB;

impl RefactoringRule for DropB {
    fn name(&self) -> &'static str {
        "drop-b"
    }

    fn description(&self) -> &'static str {
        "removes b() statements"
    }

    fn interests(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::ExpressionStatement]
    }

    fn visit(&self, node: NodeRef<'_>, cx: &mut RuleContext<'_>) -> Visit {
        if calls(node, "b") {
            cx.remove(node)
        } else {
            Visit::Descend
        }
    }
}

#[test]
fn test_second_edit_of_same_node_is_rejected() -> anyhow::Result<()> {
    let report = Refactorer::new()
        .add_rule(RetargetB {
            name: "from-a",
            trigger: "a",
            replacement: "c",
        })
        .add_rule(RetargetB {
            name: "from-x",
            trigger: "x",
            replacement: "d",
        })
        .run(&JavaFrontend::new(), "a(); x(); b();")?;

    assert_eq!(report.status, RunStatus::Converged);
    assert_eq!(report.text, "a(); x(); c();");
    assert_eq!(report.rejections.len(), 1);
    let rejection = &report.rejections[0];
    assert_eq!(rejection.rule, "from-x");
    assert_eq!(rejection.iteration, 0);
    assert!(matches!(rejection.reason, EditRejection::AlreadyEdited { .. }));
    assert_eq!(report.rule_stats["from-x"].rejections, 1);
    assert_eq!(report.rule_stats["from-x"].edits, 0);
    Ok(())
}

#[test]
fn test_edit_enclosing_an_edited_node_is_rejected() -> anyhow::Result<()> {
    let report = Refactorer::new()
        .add_rule(RetargetB {
            name: "from-a",
            trigger: "a",
            replacement: "c",
        })
        .add_shared_rule(Arc::new(DropB))
        .run(&JavaFrontend::new(), "a();\nb();\n")?;

    assert_eq!(report.status, RunStatus::Converged);
    assert_eq!(report.text, "a();\nc();\n");
    assert_eq!(report.rejections.len(), 1);
    assert!(matches!(
        report.rejections[0].reason,
        EditRejection::EnclosesEditedNode { .. }
    ));
    Ok(())
}

#[test]
fn test_untouched_text_is_preserved() -> anyhow::Result<()> {
    let source = "// header comment\nclass Demo {\n    /* keep me */\n    void run() {\n        int  spaced   =  1; // trailing\n        if (false) {\n            never();\n        }\n        done(); // end\n    }\n}\n";
    let expected = "// header comment\nclass Demo {\n    /* keep me */\n    void run() {\n        int  spaced   =  1; // trailing\n        done(); // end\n    }\n}\n";
    let report = Refactorer::with_catalog().run(&JavaFrontend::new(), source)?;
    assert_eq!(report.into_result()?, expected);
    Ok(())
}

#[test]
fn test_report_serializes_to_json() -> anyhow::Result<()> {
    let report = Refactorer::with_catalog().run(&JavaFrontend::new(), "while (false) { }")?;
    let json = serde_json::to_value(&report)?;
    assert_eq!(json["status"], "converged");
    assert_eq!(json["iterations"], 1);
    assert_eq!(json["rule_stats"]["dead-code"]["edits"], 1);
    Ok(())
}
