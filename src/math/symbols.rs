//! Command-to-symbol table for the supported math subset.

/// Unicode replacement for a symbol command, without its backslash.
///
/// Unknown commands return `None` and are passed through literally.
pub fn symbol(name: &str) -> Option<&'static str> {
    let s = match name {
        // Greek, lowercase
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" | "varepsilon" => "ε",
        "zeta" => "ζ",
        "eta" => "η",
        "theta" | "vartheta" => "θ",
        "iota" => "ι",
        "kappa" => "κ",
        "lambda" => "λ",
        "mu" => "μ",
        "nu" => "ν",
        "xi" => "ξ",
        "pi" => "π",
        "rho" | "varrho" => "ρ",
        "sigma" => "σ",
        "tau" => "τ",
        "upsilon" => "υ",
        "phi" | "varphi" => "φ",
        "chi" => "χ",
        "psi" => "ψ",
        "omega" => "ω",
        // Greek, uppercase
        "Gamma" => "Γ",
        "Delta" => "Δ",
        "Theta" => "Θ",
        "Lambda" => "Λ",
        "Xi" => "Ξ",
        "Pi" => "Π",
        "Sigma" => "Σ",
        "Phi" => "Φ",
        "Psi" => "Ψ",
        "Omega" => "Ω",
        // Large operators
        "sum" => "∑",
        "prod" => "∏",
        "int" => "∫",
        "oint" => "∮",
        "sqrt" => "√",
        // Binary operators and relations
        "cdot" => "⋅",
        "times" => "×",
        "div" => "÷",
        "pm" => "±",
        "mp" => "∓",
        "leq" | "le" => "≤",
        "geq" | "ge" => "≥",
        "neq" | "ne" => "≠",
        "approx" => "≈",
        "equiv" => "≡",
        "sim" => "∼",
        "propto" => "∝",
        "in" => "∈",
        "notin" => "∉",
        "subset" => "⊂",
        "cup" => "∪",
        "cap" => "∩",
        // Arrows
        "to" | "rightarrow" => "→",
        "leftarrow" => "←",
        "Rightarrow" => "⇒",
        "Leftrightarrow" => "⇔",
        // Miscellaneous
        "infty" => "∞",
        "partial" => "∂",
        "nabla" => "∇",
        "degree" => "°",
        "circ" => "∘",
        "ldots" | "dots" => "…",
        "cdots" => "⋯",
        "forall" => "∀",
        "exists" => "∃",
        // Sizing commands keep only the delimiter that follows them.
        "left" | "right" | "big" | "Big" | "bigg" | "Bigg" => "",
        _ => return None,
    };
    Some(s)
}

/// Replacement for a backslash followed by a single non-letter character.
pub fn escaped(c: char) -> Option<&'static str> {
    let s = match c {
        '{' => "{",
        '}' => "}",
        '$' => "$",
        '%' => "%",
        '_' => "_",
        '&' => "&",
        '#' => "#",
        ',' | ';' | ':' | ' ' | '\\' => " ",
        '!' => "",
        _ => return None,
    };
    Some(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_symbols() {
        assert_eq!(symbol("sum"), Some("∑"));
        assert_eq!(symbol("Delta"), Some("Δ"));
        assert_eq!(symbol("left"), Some(""));
        assert_eq!(symbol("unknowncommand"), None);
    }

    #[test]
    fn test_escapes() {
        assert_eq!(escaped('{'), Some("{"));
        assert_eq!(escaped(','), Some(" "));
        assert_eq!(escaped('q'), None);
    }
}
