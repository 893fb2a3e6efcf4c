//! Derives everything an equation element needs from its markup, in one pass.

use crate::classifier::{Complexity, ComplexityClassifier};
use crate::content::MathContent;
use crate::expression::Expression;
use crate::segmenter::{Part, SPOKEN_PLACEHOLDER, SegmentationStrategy, segment_expression, segment_parts};
use crate::speech::{Verbosity, speak_expression, speakable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub classifier: ComplexityClassifier,
    pub infer_mathml_complexity: bool,
    pub strategy: SegmentationStrategy,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            classifier: ComplexityClassifier::default(),
            infer_mathml_complexity: false,
            strategy: SegmentationStrategy::SpokenText,
        }
    }
}

/// Immutable derived state for one piece of math content.
#[derive(Debug, Clone)]
pub struct EquationAnalysis {
    fingerprint: String,
    expression: Expression,
    complexity: Complexity,
    spoken_text: String,
    parts: Vec<Part>,
}

impl EquationAnalysis {
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn complexity(&self) -> Complexity {
        self.complexity
    }

    pub fn is_substantial(&self) -> bool {
        self.complexity.substantial
    }

    /// Full brief spoken rendering.
    pub fn spoken_text(&self) -> &str {
        &self.spoken_text
    }

    /// Never empty.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }
}

pub fn analyze(content: &MathContent, options: &AnalysisOptions) -> EquationAnalysis {
    let expression = match (content.latex(), content.mathml()) {
        (Some(latex), _) => Expression::from_latex(latex),
        (None, Some(mathml)) => Expression::from_mathml(mathml),
        (None, None) => Expression::verbatim(content.spoken_fallback().unwrap_or_default()),
    };

    let mathml_signal = (options.infer_mathml_complexity && content.latex().is_none())
        .then(|| options.classifier.mathml_signal(&expression));
    let complexity = options.classifier.classify(content, mathml_signal);

    let spoken_text = full_spoken_text(content, &expression);
    let parts = match options.strategy {
        SegmentationStrategy::SpokenText => segment_parts(&spoken_text),
        SegmentationStrategy::ExpressionTree => segment_expression(&expression),
    };

    tracing::debug!(
        substantial = complexity.substantial,
        triggers = complexity.distinct_triggers,
        parts = parts.len(),
        strategy = %options.strategy,
        "Analyzed math content"
    );

    EquationAnalysis {
        fingerprint: content.fingerprint(),
        expression,
        complexity,
        spoken_text,
        parts,
    }
}

/// The pre-rendered fallback wins; otherwise LaTeX is rendered lexically and
/// MathML structurally.
fn full_spoken_text(content: &MathContent, expression: &Expression) -> String {
    if let Some(spoken) = content.spoken_fallback() {
        return spoken.trim().to_string();
    }
    if let Some(latex) = content.latex() {
        return speakable(latex, Verbosity::Brief).trim().to_string();
    }
    if content.mathml().is_some() && !expression.is_verbatim() {
        return speak_expression(expression, Verbosity::Brief);
    }
    SPOKEN_PLACEHOLDER.to_string()
}
