// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! ASP program text for clingo, and answer-set parsing

use super::{EnforcementProblem, Framework, Semantics};

/// Render an argument id as an ASP term
///
/// Plain lowercase identifiers pass through; anything else becomes a
/// quoted string. Quoted strings decode back to the same id.
pub fn quote_id(id: &str) -> String {
    let mut chars = id.chars();
    let plain = matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && id != "not";
    if plain {
        return id.to_string();
    }
    let mut out = String::with_capacity(id.len() + 2);
    out.push('"');
    for c in id.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Decode one term produced by [`quote_id`]
pub fn unquote(term: &str) -> String {
    let term = term.trim();
    let Some(inner) = term.strip_prefix('"').and_then(|t| t.strip_suffix('"')) else {
        return term.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Split `text` on `sep` outside quoted strings
fn split_outside_quotes(text: &str, sep: impl Fn(char) -> bool) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;
    for c in text.chars() {
        if in_quotes {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quotes = false;
            }
        } else if c == '"' {
            in_quotes = true;
            current.push(c);
        } else if sep(c) {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Atoms of one answer-set line
pub fn split_atoms(line: &str) -> Vec<String> {
    split_outside_quotes(line, char::is_whitespace)
}

/// `name(t1,...,tn)` into the name and decoded arguments
pub fn parse_atom(atom: &str) -> Option<(String, Vec<String>)> {
    let atom = atom.trim();
    let Some(open) = atom.find('(') else {
        return Some((atom.to_string(), vec![]));
    };
    let body = atom[open + 1..].strip_suffix(')')?;
    let args = split_outside_quotes(body, |c| c == ',')
        .iter()
        .map(|a| unquote(a))
        .collect();
    Some((atom[..open].to_string(), args))
}

/// `name(a,b)` into its two arguments
pub fn parse_binary(atom: &str, name: &str) -> Option<(String, String)> {
    let (found, mut args) = parse_atom(atom)?;
    if found != name || args.len() != 2 {
        return None;
    }
    let second = args.pop()?;
    let first = args.pop()?;
    Some((first, second))
}

/// Facts `arg/1` and `att/2` under the given predicate names
pub fn framework_facts(framework: &Framework, arg: &str, att: &str) -> Vec<String> {
    let mut facts: Vec<String> = framework
        .arguments
        .iter()
        .map(|a| format!("{}({}).", arg, quote_id(a)))
        .collect();
    facts.extend(
        framework
            .attacks
            .iter()
            .map(|(s, t)| format!("{}({},{}).", att, quote_id(s), quote_id(t))),
    );
    facts
}

/// Grounded extension by iterating the characteristic function `n` times
pub fn grounded_encoding(argument_count: usize) -> String {
    format!(
        "\
step(0..{n}).
defeated(X,I) :- att(Y,X), in(Y,I), step(I).
undefended(X,I) :- arg(X), att(Y,X), step(I), not defeated(Y,I).
in(X,I+1) :- arg(X), step(I), step(I+1), not undefended(X,I).
in(X) :- in(X,{n}).
",
        n = argument_count.max(1)
    )
}

/// Admissible sets
pub const ADMISSIBLE_ENCODING: &str = "\
{ in(X) : arg(X) }.
:- in(X), in(Y), att(X,Y).
defeated(X) :- in(Y), att(Y,X).
:- in(X), att(Y,X), not defeated(Y).
";

/// Subset-maximal admissible sets under domain-heuristic enumeration
pub const PREFERRED_HEURISTIC: &str = "#heuristic in(X) : arg(X). [1,true]\n";

/// Stable extensions
pub const STABLE_ENCODING: &str = "\
{ in(X) : arg(X) }.
:- in(X), in(Y), att(X,Y).
defeated(X) :- in(Y), att(Y,X).
:- arg(X), not in(X), not defeated(X).
";

/// Program enumerating every extension of `framework`
pub fn extensions_program(framework: &Framework, semantics: Semantics) -> String {
    let mut lines = framework_facts(framework, "arg", "att");
    lines.push(match semantics {
        Semantics::Grounded => grounded_encoding(framework.arguments.len()),
        Semantics::Preferred => format!("{}{}", ADMISSIBLE_ENCODING, PREFERRED_HEURISTIC),
        Semantics::Stable => STABLE_ENCODING.to_string(),
    });
    lines.push("#show in/1.".to_string());
    lines.join("\n") + "\n"
}

/// Extra clingo flags for enumerating `semantics`
pub fn extensions_flags(semantics: Semantics) -> Vec<String> {
    let mut flags = vec!["-n".to_string(), "0".to_string()];
    if semantics == Semantics::Preferred {
        flags.push("--heuristic=Domain".to_string());
        flags.push("--enum-mode=domRec".to_string());
    }
    flags
}

/// Edit guesses, the edited attack relation, and credulous goal acceptance
///
/// Grounded is encoded exactly. Preferred and stable ask for membership in
/// some admissible or stable set, which skeptical acceptance implies but
/// does not guarantee.
fn enforcement_base(problem: &EnforcementProblem) -> Vec<String> {
    let mut lines = framework_facts(&problem.framework, "arg0", "att0");
    lines.push(format!("goal({}).", quote_id(&problem.goal)));
    for (s, t) in &problem.deletable {
        lines.push(format!("cand_del({},{}).", quote_id(s), quote_id(t)));
    }
    for (s, t) in &problem.addable {
        lines.push(format!("cand_add({},{}).", quote_id(s), quote_id(t)));
    }
    lines.push(
        "\
arg(X) :- arg0(X).
{ del_att(X,Y) } :- cand_del(X,Y), att0(X,Y).
{ add_att(X,Y) } :- cand_add(X,Y), not att0(X,Y).
att(X,Y) :- att0(X,Y), not del_att(X,Y).
att(X,Y) :- add_att(X,Y)."
            .to_string(),
    );
    lines.push(match problem.semantics {
        Semantics::Grounded => grounded_encoding(problem.framework.arguments.len()),
        Semantics::Stable => STABLE_ENCODING.to_string(),
        Semantics::Preferred => ADMISSIBLE_ENCODING.to_string(),
    });
    lines.push(":- goal(G), not in(G).".to_string());
    lines
}

const EDIT_COUNT: &str = "#count{ d,X,Y : del_att(X,Y) ; a,X,Y : add_att(X,Y) }";
const SHOW_EDITS: &str = "#show del_att/2.\n#show add_att/2.";

/// Optimization program for attack enforcement under credulous acceptance
pub fn enforcement_program(problem: &EnforcementProblem) -> String {
    let mut lines = enforcement_base(problem);
    lines.push(format!(":- {} > {}.", EDIT_COUNT, problem.max_edits));
    lines.push(
        "#minimize { 1,d,X,Y : del_att(X,Y) ; 1,a,X,Y : add_att(X,Y) }.".to_string(),
    );
    lines.push(SHOW_EDITS.to_string());
    lines.join("\n") + "\n"
}

/// Every edit set of exactly `cost` edits under which the goal is credulously accepted
///
/// Candidates for skeptical enforcement; each one is checked against the
/// full extension family before it is kept.
pub fn enforcement_level_program(problem: &EnforcementProblem, cost: usize) -> String {
    let mut lines = enforcement_base(problem);
    lines.push(format!(":- {} != {}.", EDIT_COUNT, cost));
    lines.push(SHOW_EDITS.to_string());
    lines.join("\n") + "\n"
}

/// Enumerate distinct edit sets
pub fn level_flags() -> Vec<String> {
    vec!["--project".to_string(), "-n".to_string(), "0".to_string()]
}

pub fn enforcement_flags() -> Vec<String> {
    vec![
        "--opt-mode=optN".to_string(),
        "--project".to_string(),
        "-n".to_string(),
        "0".to_string(),
    ]
}

/// One model from clingo's text output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSet {
    pub atoms: Vec<String>,
    pub cost: Option<usize>,
}

/// Parsed clingo run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClingoRun {
    pub answers: Vec<AnswerSet>,
    pub satisfiable: Option<bool>,
    pub optimum_found: bool,
}

/// Parse `Answer:` blocks and the trailing result line
pub fn parse_output(output: &str) -> ClingoRun {
    let mut run = ClingoRun::default();
    let mut lines = output.lines().peekable();
    while let Some(line) = lines.next() {
        let line = line.trim();
        if line.starts_with("Answer:") {
            let atoms = match lines.peek() {
                Some(next) if !next.trim().starts_with("Optimization:") => {
                    let next = lines.next().unwrap_or_default();
                    split_atoms(next)
                }
                _ => vec![],
            };
            run.answers.push(AnswerSet { atoms, cost: None });
        } else if let Some(cost) = line.strip_prefix("Optimization:") {
            let total = cost
                .split_whitespace()
                .filter_map(|c| c.parse::<usize>().ok())
                .sum();
            if let Some(last) = run.answers.last_mut() {
                last.cost = Some(total);
            }
        } else if line == "OPTIMUM FOUND" {
            run.optimum_found = true;
            run.satisfiable = Some(true);
        } else if line == "SATISFIABLE" {
            run.satisfiable = Some(true);
        } else if line == "UNSATISFIABLE" {
            run.satisfiable = Some(false);
        }
    }
    run
}
