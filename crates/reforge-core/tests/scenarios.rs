//! End-to-end runs of the built-in catalog over small documents.

use pretty_assertions::assert_eq;
use reforge_core::frontend::JavaFrontend;
use reforge_core::{NodeKind, NodeRef, RefactoringRule, Refactorer, RuleContext, RunStatus, SyntaxKind, Visit};

fn catalog(source: &str) -> anyhow::Result<(String, usize)> {
    let report = Refactorer::with_catalog().run(&JavaFrontend::new(), source)?;
    let iterations = report.iterations;
    Ok((report.into_result()?, iterations))
}

#[test]
fn test_constant_true_if_keeps_then_branch() -> anyhow::Result<()> {
    let (text, iterations) = catalog("if (true) { foo(); } else { bar(); }")?;
    assert_eq!(text, "foo();");
    assert_eq!(iterations, 1);
    Ok(())
}

#[test]
fn test_while_false_is_removed() -> anyhow::Result<()> {
    let source = "before();\nwhile (false) { doWork(); }\nafter(); // stays\n";
    let (text, _) = catalog(source)?;
    assert_eq!(text, "before();\nafter(); // stays\n");
    Ok(())
}

#[test]
fn test_assert_true_of_equals() -> anyhow::Result<()> {
    let source = "import static org.testng.Assert.*;\nassertTrue(a.equals(b));\n";
    let (text, _) = catalog(source)?;
    assert_eq!(text, "import static org.testng.Assert.*;\nassertEquals(a, b);\n");
    Ok(())
}

#[test]
fn test_compare_to_minus_one() -> anyhow::Result<()> {
    let frontend = JavaFrontend::new()
        .with_binding("x", "Integer")
        .with_binding("y", "Integer");
    let report = Refactorer::with_catalog().run(&frontend, "boolean r = x.compareTo(y) == -1;")?;
    assert_eq!(report.into_result()?, "boolean r = x < y;");
    Ok(())
}

#[test]
fn test_redundant_null_check_before_equals() -> anyhow::Result<()> {
    let (text, iterations) = catalog("if (!(a != null && a.equals(b))) { }")?;
    assert_eq!(text, "if (!a.equals(b)) { }");
    // Null check first, then the parentheses it leaves behind.
    assert_eq!(iterations, 2);
    Ok(())
}

struct Rename {
    name: &'static str,
    from: &'static str,
    to: &'static str,
}

impl RefactoringRule for Rename {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        "renames a variable"
    }

    fn interests(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::Name]
    }

    fn visit(&self, node: NodeRef<'_>, cx: &mut RuleContext<'_>) -> Visit {
        match node.kind() {
            NodeKind::Name(name) if name == self.from => {
                let to = self.to;
                cx.replace_with(node, |b| b.name(to))
            }
            _ => Visit::Descend,
        }
    }
}

#[test]
fn test_cyclic_rules_hit_the_iteration_cap() {
    let report = Refactorer::new()
        .add_rule(Rename {
            name: "a-to-b",
            from: "a",
            to: "b",
        })
        .add_rule(Rename {
            name: "b-to-a",
            from: "b",
            to: "a",
        })
        .max_iterations(4)
        .run(&JavaFrontend::new(), "f(a);")
        .unwrap();

    assert_eq!(report.status, RunStatus::NonConvergence);
    assert_eq!(report.iterations, 4);
    // Last rendered text survives: a -> b -> a -> b -> a.
    assert_eq!(report.text, "f(a);");
    assert_eq!(report.rules_applied(), vec!["a-to-b", "b-to-a"]);
    assert!(report.into_result().is_err());
}

#[test]
fn test_full_method_body() -> anyhow::Result<()> {
    let source = r#"import static org.testng.Assert.*;

class CheckoutTest {
    void totals(Cart cart) {
        Integer expected = cart.expected();
        if (cart == null) {
            fail("no cart");
        }
        while (false) {
            cart.clear();
        }
        assertTrue(this.total(cart).equals(expected));
        boolean debug = false;
        if (debug && (verbose == true)) {
            log(cart);
        }
    }
}
"#;
    let expected = r#"import static org.testng.Assert.*;

class CheckoutTest {
    void totals(Cart cart) {
        Integer expected = cart.expected();
        assertNotNull(cart, "no cart");
        assertEquals(total(cart), expected);
        boolean debug = false;
        if (debug && verbose) {
            log(cart);
        }
    }
}
"#;
    let (text, _) = catalog(source)?;
    assert_eq!(text, expected);
    Ok(())
}
