//! Consistency locking for modification prompts.
//!
//! A locked prompt declares every field NOT named by the modification
//! delta as frozen, leaving only the delta's targets open. The negative
//! prompt gains terms specifically forbidding drift of the frozen fields.
//! Retries intensify the lock from the validator's correction hints
//! rather than re-rolling anything.

use archgen_types::dna::{DesignDna, FieldPath};
use archgen_types::drift::CorrectionHint;

use super::builder::{PromptBuilder, PromptBundle};

/// Apply a consistency lock to a base prompt for one modification.
///
/// `declared_groups` are the field groups the caller intends to change
/// (from quick toggles and delta text); every declaration outside them is
/// frozen with its byte-identical base wording plus a `-- do not change`
/// suffix, so undeclared fields read exactly as they did at baseline.
pub fn with_consistency_lock(
    base: &PromptBundle,
    delta_prompt: &str,
    user_prompt: Option<&str>,
    dna: &DesignDna,
    declared_groups: &[&str],
) -> PromptBundle {
    let (frozen, open): (Vec<_>, Vec<_>) = PromptBuilder::element_declarations(dna)
        .into_iter()
        .partition(|(path, _)| !is_declared(path, declared_groups));

    let mut sections = Vec::new();
    sections.push(format!("MODIFY: {}", delta_prompt.trim()));
    if let Some(user) = user_prompt {
        let user = user.trim();
        if !user.is_empty() {
            sections.push(format!("CONTEXT: {user}"));
        }
    }

    if !open.is_empty() {
        sections.push(format!(
            "OPEN TO CHANGE:\n{}",
            open.iter()
                .map(|(_, line)| line.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        ));
    }

    sections.push(format!(
        "FROZEN (reproduce exactly):\n{}",
        frozen
            .iter()
            .map(|(_, line)| format!("{line} -- do not change"))
            .collect::<Vec<_>>()
            .join("\n")
    ));

    sections.push(base.prompt.clone());

    let mut negative = base.negative_prompt.clone();
    for (path, _) in &frozen {
        negative.push_str(&format!(", altered {}", negative_label(path)));
    }

    PromptBundle {
        prompt: sections.join("\n\n"),
        negative_prompt: negative,
    }
}

/// Strengthen an already-locked prompt from the validator's correction
/// hints before a retry. Deterministic: the same hints always produce the
/// same intensified prompt.
pub fn intensify(locked: &PromptBundle, hints: &[CorrectionHint]) -> PromptBundle {
    if hints.is_empty() {
        return locked.clone();
    }

    let mut prompt = locked.prompt.clone();
    let mut negative = locked.negative_prompt.clone();
    let mut restated = Vec::new();
    let mut raise_guidance = false;

    for hint in hints {
        match hint {
            CorrectionHint::StrengthenNegative { field } => {
                negative.push_str(&format!(
                    ", any deviation in {}, drifted {}",
                    negative_label(field),
                    negative_label(field)
                ));
            }
            CorrectionHint::RestateLock { field } => {
                restated.push(format!(
                    "CRITICAL: {} must be reproduced pixel-faithful to the baseline",
                    negative_label(field)
                ));
            }
            CorrectionHint::RaiseGuidance => raise_guidance = true,
        }
    }

    if !restated.is_empty() {
        prompt = format!("{}\n\n{}", restated.join("\n"), prompt);
    }
    if raise_guidance {
        prompt = format!("STRICT ADHERENCE REQUIRED: follow every declaration literally.\n\n{prompt}");
    }

    PromptBundle {
        prompt,
        negative_prompt: negative,
    }
}

fn is_declared(path: &FieldPath, declared_groups: &[&str]) -> bool {
    declared_groups.contains(&path.group())
}

/// Human wording for a field path in negative-prompt terms.
fn negative_label(path: &FieldPath) -> String {
    path.0.replace('.', " ").replace('_', " ")
}
