//! Transcription of the supported math notation subset.
//!
//! Formulas are delimited by `$...$` (inline) or `$$...$$` (display) and
//! support plain symbol runs, `\frac{A}{B}`, sub/superscripts (`X_a`,
//! `X^b`, `X_{a}^{b}`) and a table of symbol commands. Anything else is
//! passed through literally; transcription never fails.
//!
//! ```
//! use memoria::math::{split_math, MathSegment};
//! use memoria::model::MathNode;
//!
//! let segments = split_math(r"Flecha: $\frac{qL^4}{8EI}$");
//! let MathSegment::Math(formula) = &segments[1] else { unreachable!() };
//! assert!(matches!(formula.nodes[0], MathNode::Fraction { .. }));
//! ```

mod delimit;
mod parser;
mod symbols;

pub use delimit::{MathSegment, contains_math, split_math};
pub use parser::transcribe;
pub use symbols::symbol;
