//! Pure math-to-speech model: parsing, classification, speech rendering and
//! part segmentation. Nothing here schedules work or talks to a platform.

pub mod analysis;
pub mod classifier;
pub mod content;
pub mod expression;
mod latex;
mod mathml;
pub mod segmenter;
pub mod speech;

pub use analysis::{AnalysisOptions, EquationAnalysis, analyze};
pub use classifier::{Complexity, ComplexityBasis, ComplexityClassifier};
pub use content::MathContent;
pub use expression::{
    Expression, ExpressionSource, Granularity, MAX_NESTING_DEPTH, Node, NodeKind,
};
pub use segmenter::{
    FALLBACK_PART_TEXT, Part, SPOKEN_PLACEHOLDER, SegmentationStrategy, segment_expression,
    segment_parts,
};
pub use speech::{Verbosity, speak_expression, speakable};
