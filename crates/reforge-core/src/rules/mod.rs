/*!
# Rule Catalog

Built-in rule families, in catalog order. Catalog order is dispatch
order: when two rules want the same node, the earlier one wins.

| name | rule |
|---|---|
| `dead-code` | [`DeadCodeElimination`] |
| `simplify-expression` | [`SimplifyExpression`] |
| `testng-assert` | [`TestNGAssert`] |
*/

use std::sync::Arc;

use crate::engine::RefactoringRule;

pub mod dead_code;
pub mod simplify_expression;
pub mod testng_assert;

pub use dead_code::DeadCodeElimination;
pub use simplify_expression::SimplifyExpression;
pub use testng_assert::TestNGAssert;

/// Every built-in rule, in catalog order.
pub fn all_rules() -> Vec<Arc<dyn RefactoringRule>> {
    vec![
        Arc::new(DeadCodeElimination),
        Arc::new(SimplifyExpression),
        Arc::new(TestNGAssert),
    ]
}

/// Looks up a built-in rule by its [`RefactoringRule::name`].
pub fn by_name(name: &str) -> Option<Arc<dyn RefactoringRule>> {
    all_rules().into_iter().find(|rule| rule.name() == name)
}
