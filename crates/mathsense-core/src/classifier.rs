//! Cheap "is this expression substantial" gate, evaluated on every render.

use crate::content::MathContent;
use crate::expression::Expression;

/// Operator triggers, spelled as they appear in LaTeX source.
pub const COMPLEXITY_TRIGGERS: [&str; 7] = ["+", "=", r"\frac", r"\sqrt", "^", r"\cdot", r"\times"];

pub const DEFAULT_MIN_DISTINCT_TRIGGERS: usize = 2;

/// Which input decided the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplexityBasis {
    Latex,
    MathMlSignal,
    /// No LaTeX and no MathML signal; defaults to inline speech.
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Complexity {
    pub substantial: bool,
    pub distinct_triggers: usize,
    pub basis: ComplexityBasis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplexityClassifier {
    min_distinct_triggers: usize,
}

impl Default for ComplexityClassifier {
    fn default() -> Self {
        Self {
            min_distinct_triggers: DEFAULT_MIN_DISTINCT_TRIGGERS,
        }
    }
}

impl ComplexityClassifier {
    pub fn new(min_distinct_triggers: usize) -> Self {
        Self {
            min_distinct_triggers: min_distinct_triggers.max(1),
        }
    }

    pub fn min_distinct_triggers(&self) -> usize {
        self.min_distinct_triggers
    }

    pub fn is_substantial_latex(&self, latex: &str) -> bool {
        distinct_triggers(latex) >= self.min_distinct_triggers
    }

    /// MathML complexity signal derived from a parsed tree.
    pub fn mathml_signal(&self, expression: &Expression) -> bool {
        expression.triggers().len() >= self.min_distinct_triggers
    }

    /// Classifies content. LaTeX wins when present; otherwise the caller's
    /// MathML signal decides, and without one the answer is "not substantial".
    pub fn classify(&self, content: &MathContent, mathml_signal: Option<bool>) -> Complexity {
        if let Some(latex) = content.latex() {
            let count = distinct_triggers(latex);
            return Complexity {
                substantial: count >= self.min_distinct_triggers,
                distinct_triggers: count,
                basis: ComplexityBasis::Latex,
            };
        }
        match (content.mathml(), mathml_signal) {
            (Some(_), Some(signal)) => Complexity {
                substantial: signal,
                distinct_triggers: 0,
                basis: ComplexityBasis::MathMlSignal,
            },
            _ => Complexity {
                substantial: false,
                distinct_triggers: 0,
                basis: ComplexityBasis::Unavailable,
            },
        }
    }
}

/// Number of distinct trigger tokens present anywhere in `latex`.
pub fn distinct_triggers(latex: &str) -> usize {
    COMPLEXITY_TRIGGERS
        .iter()
        .filter(|trigger| latex.contains(*trigger))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_plus_root_is_substantial() {
        let classifier = ComplexityClassifier::default();
        assert!(classifier.is_substantial_latex(r"\frac{1}{2}+\sqrt{4}"));
        assert_eq!(distinct_triggers(r"\frac{1}{2}+\sqrt{4}"), 3);
    }

    #[test]
    fn single_trigger_is_inline() {
        let classifier = ComplexityClassifier::default();
        assert!(!classifier.is_substantial_latex("x^2"));
        assert!(!classifier.is_substantial_latex("x^2^3"));
    }

    #[test]
    fn cdot_and_times_count_separately() {
        assert_eq!(distinct_triggers(r"a \cdot b \times c"), 2);
    }

    #[test]
    fn mathml_without_signal_is_not_substantial() {
        let classifier = ComplexityClassifier::default();
        let content = MathContent::default()
            .with_mathml("<math><mfrac><mn>1</mn><mn>2</mn></mfrac><mo>+</mo><mn>1</mn></math>");
        let verdict = classifier.classify(&content, None);
        assert!(!verdict.substantial);
        assert_eq!(verdict.basis, ComplexityBasis::Unavailable);

        let verdict = classifier.classify(&content, Some(true));
        assert!(verdict.substantial);
        assert_eq!(verdict.basis, ComplexityBasis::MathMlSignal);
    }

    #[test]
    fn mathml_signal_counts_tree_triggers() {
        let classifier = ComplexityClassifier::default();
        let expr = Expression::from_mathml(
            "<math><mfrac><mn>1</mn><mn>2</mn></mfrac><mo>+</mo><mn>1</mn></math>",
        );
        assert!(classifier.mathml_signal(&expr));
        let broken = Expression::from_mathml("<math><mfrac>");
        assert!(!classifier.mathml_signal(&broken));
    }

    #[test]
    fn threshold_is_configurable_but_never_zero() {
        assert!(ComplexityClassifier::new(1).is_substantial_latex("x^2"));
        assert_eq!(ComplexityClassifier::new(0).min_distinct_triggers(), 1);
    }
}
