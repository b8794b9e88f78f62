//! Short table aliases for generated query text
//!
//! One `AliasAssigner` covers one generated artifact (a stored procedure, a
//! view, a query). Aliases are unique within that scope, stable for a type
//! once assigned, lowercase ASCII, never an SQL reserved word and never
//! longer than the configured maximum.

use std::collections::{HashMap, HashSet};
use stratum_core::{EngineError, EngineResult, TypeId};
use stratum_ir::TypeDef;

/// Words that cannot be used as a bare alias
const RESERVED_WORDS: &[&str] = &[
    "as", "at", "by", "do", "if", "in", "is", "no", "of", "on", "or", "to", "add", "all", "and",
    "any", "asc", "end", "for", "key", "not", "row", "set", "top", "use", "case", "cast", "desc",
    "drop", "else", "from", "full", "into", "join", "left", "like", "null", "only", "over",
    "then", "user", "view", "when", "with", "check", "cross", "fetch", "group", "inner", "limit",
    "order", "outer", "right", "table", "union", "where", "column", "create", "delete", "except",
    "exists", "having", "insert", "offset", "select", "update", "values", "between", "default",
    "distinct", "natural", "primary", "foreign",
];

/// Check if a word is reserved in generated SQL
pub fn is_reserved(word: &str) -> bool {
    RESERVED_WORDS.contains(&word)
}

// ============================================================================
// AliasAssigner
// ============================================================================

/// Assigns collision-free aliases within one artifact scope
#[derive(Debug, Clone)]
pub struct AliasAssigner {
    max_length: usize,
    /// Assignments in first-encounter order
    assigned: Vec<(TypeId, String)>,
    /// Lookup: type → index into `assigned`
    by_type: HashMap<TypeId, usize>,
    taken: HashSet<String>,
}

impl AliasAssigner {
    /// Create an empty scope
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            assigned: Vec::new(),
            by_type: HashMap::new(),
            taken: HashSet::new(),
        }
    }

    /// Alias for a type, assigning one on first request
    pub fn alias_for(&mut self, ty: &TypeDef) -> EngineResult<String> {
        self.assign(ty.id, &ty.name)
    }

    /// Alias for the type with the given key and name.
    ///
    /// The first letter of the name is tried first, then progressively
    /// longer prefixes, then the first letter followed by a counter.
    pub fn assign(&mut self, id: TypeId, name: &str) -> EngineResult<String> {
        if let Some(&index) = self.by_type.get(&id) {
            return Ok(self.assigned[index].1.clone());
        }

        let alias = self
            .pick(name)
            .ok_or_else(|| EngineError::AliasExhaustion {
                type_name: name.to_string(),
                max_length: self.max_length,
            })?;

        tracing::debug!("Assigned alias '{}' to '{}'", alias, name);
        self.taken.insert(alias.clone());
        self.by_type.insert(id, self.assigned.len());
        self.assigned.push((id, alias.clone()));
        Ok(alias)
    }

    fn pick(&self, name: &str) -> Option<String> {
        let letters = alias_letters(name);
        let is_free = |candidate: &str| !self.taken.contains(candidate) && !is_reserved(candidate);

        let longest = letters.len().min(self.max_length);
        for length in 1..=longest {
            let candidate = &letters[..length];
            if is_free(candidate) {
                return Some(candidate.to_string());
            }
        }

        let base = &letters[..1];
        (1..)
            .map(|n| format!("{}{}", base, n))
            .take_while(|candidate| candidate.len() <= self.max_length)
            .find(|candidate| is_free(candidate))
    }

    /// Previously assigned alias of a type
    pub fn alias_of(&self, id: TypeId) -> Option<&str> {
        self.by_type
            .get(&id)
            .map(|&index| self.assigned[index].1.as_str())
    }

    /// All assignments in first-encounter order
    pub fn aliases(&self) -> &[(TypeId, String)] {
        &self.assigned
    }

    /// Number of assigned aliases
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    /// Check if nothing has been assigned yet
    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

/// Lowercase ASCII alphanumerics of a name, starting with a letter
fn alias_letters(name: &str) -> String {
    let letters: String = name
        .chars()
        .flat_map(char::to_lowercase)
        .filter(char::is_ascii_alphanumeric)
        .collect();

    match letters.chars().next() {
        Some(first) if first.is_ascii_alphabetic() => letters,
        _ => format!("t{}", letters),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assigner() -> AliasAssigner {
        AliasAssigner::new(8)
    }

    #[test]
    fn test_first_letter() {
        assert_eq!(assigner().assign(TypeId(0), "foobar").unwrap(), "f");
        assert_eq!(assigner().assign(TypeId(0), "FooBar").unwrap(), "f");
    }

    #[test]
    fn test_collision_lengthens() {
        let mut scope = assigner();
        let a = scope.assign(TypeId(0), "fooBar").unwrap();
        let b = scope.assign(TypeId(1), "food").unwrap();
        assert_eq!(a, "f");
        assert_eq!(b, "fo");
        assert_ne!(a, b);
    }

    #[test]
    fn test_idempotent_per_type() {
        let mut scope = assigner();
        let first = scope.assign(TypeId(3), "customer").unwrap();
        scope.assign(TypeId(4), "country").unwrap();
        let again = scope.assign(TypeId(3), "customer").unwrap();
        assert_eq!(first, again);
        assert_eq!(scope.len(), 2);
        assert_eq!(scope.alias_of(TypeId(4)), Some("co"));
    }

    #[test]
    fn test_reserved_words_skipped() {
        let mut scope = assigner();
        scope.assign(TypeId(0), "owner").unwrap();
        // "o" taken, "or" reserved
        assert_eq!(scope.assign(TypeId(1), "order").unwrap(), "ord");

        let mut scope = assigner();
        // "a" is free, but "as" never is
        scope.assign(TypeId(0), "account").unwrap();
        assert_eq!(scope.assign(TypeId(1), "asset").unwrap(), "ass");
    }

    #[test]
    fn test_counter_after_exhausting_name() {
        let mut scope = assigner();
        scope.assign(TypeId(0), "ab").unwrap();
        scope.assign(TypeId(1), "ab_c").unwrap();
        // "a" and "ab" both taken, name exhausted
        assert_eq!(scope.assign(TypeId(2), "a_b").unwrap(), "a1");
        assert_eq!(scope.assign(TypeId(3), "AB").unwrap(), "a2");
    }

    #[test]
    fn test_non_letter_names() {
        let mut scope = assigner();
        assert_eq!(scope.assign(TypeId(0), "2fa_code").unwrap(), "t");
        assert_eq!(scope.assign(TypeId(1), "").unwrap(), "t1");
        assert_eq!(scope.assign(TypeId(2), "_tag").unwrap(), "ta");
    }

    #[test]
    fn test_max_length_respected() {
        let mut scope = AliasAssigner::new(2);
        for (i, name) in ["alpha", "alphabet", "alpine", "altitude"].iter().enumerate() {
            let alias = scope.assign(TypeId(i), name).unwrap();
            assert!(alias.len() <= 2, "{alias}");
        }
        assert_eq!(
            scope.aliases().iter().map(|(_, a)| a.as_str()).collect::<Vec<_>>(),
            vec!["a", "al", "a1", "a2"]
        );
    }

    #[test]
    fn test_exhaustion() {
        let mut scope = AliasAssigner::new(1);
        scope.assign(TypeId(0), "foo").unwrap();
        let err = scope.assign(TypeId(1), "far").unwrap_err();
        assert!(matches!(
            err,
            EngineError::AliasExhaustion { max_length: 1, .. }
        ));
        assert_eq!(err.type_name(), Some("far"));
    }

    #[test]
    fn test_aliases_are_unique_and_well_formed() {
        let mut scope = AliasAssigner::new(4);
        let names = [
            "order", "order_line", "orders", "owner", "option", "on_hold", "one", "o", "Other",
        ];
        for (i, name) in names.iter().enumerate() {
            scope.assign(TypeId(i), name).unwrap();
        }

        let aliases: Vec<&str> = scope.aliases().iter().map(|(_, a)| a.as_str()).collect();
        let unique: HashSet<&str> = aliases.iter().copied().collect();
        assert_eq!(unique.len(), aliases.len());
        for alias in aliases {
            assert!(alias.len() <= 4);
            assert!(!is_reserved(alias));
            assert!(alias.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }
}
