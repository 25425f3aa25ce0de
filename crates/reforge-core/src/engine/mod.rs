/*!
# Rewrite Engine

Runs a catalog of independent rules over one document until none of them
has anything left to change.

## Overview

One run is a sequence of passes over successive snapshots of the document:

1. the frontend parses the current text into a `SyntaxTree`;
2. the traversal driver walks the tree in pre-order and dispatches every
   node to the rules interested in its kind;
3. rules stage edits in an `EditBatch`, which accepts the first edit for
   a region and rejects overlapping ones;
4. the text mapper projects the accepted batch onto the source text;
5. the new text is re-parsed and the next pass starts.

A pass that stages no edit is a fixpoint. The number of applied batches
is bounded by `Refactorer::max_iterations`.

## Architecture

- `RefactoringRule`: trait implemented by every rule
- `RuleContext`: per-visit handle for resolver queries and edit staging
- `EditBatch`: staged edits of one pass plus the conflict rules
- `traversal`: dispatch table and pre-order driver
- `text_mapper`: turns a batch into the next document text
- `Refactorer`: fixpoint driver producing a `RunReport`

## Example Usage

```rust
use reforge_core::engine::Refactorer;
use reforge_core::frontend::java::JavaFrontend;

let report = Refactorer::with_catalog()
    .max_iterations(5)
    .run(&JavaFrontend::new(), "if (true) { foo(); }")?;
assert_eq!(report.text, "foo();");
# Ok::<(), reforge_core::RefactorError>(())
```
*/

pub mod batch;
pub mod fixpoint;
pub mod rules;
pub mod text_mapper;
pub mod traversal;

pub use batch::{AcceptedEdit, Edit, EditBatch, EditRejection, RejectedEdit};
pub use fixpoint::{CancellationToken, Refactorer, RunReport, RunStatus};
pub use rules::{RefactoringRule, RuleContext, RuleStats, Visit};
pub use text_mapper::ProjectionError;
