//! Interface assembly — applies the inclusion policy and inheritance
//! rewriting, synthesizes getters, and renders the output text in its fixed
//! order. No reordering directives exist; the order is part of the format.

use tracing::debug;

use crate::doc::collect_doc_block;
use crate::generate::Generator;
use crate::subst::substitute;
use crate::types::{
    ContractHeader, DirectiveSets, FunctionDecl, GenError, VarType, VariableDecl, Visibility,
    INTERFACE_PREAMBLE, MEMBER_INDENT,
};

// ---------------------------------------------------------------------------
// Inclusion policy
// ---------------------------------------------------------------------------

/// A function appears in the output when explicitly included (overrides
/// everything), or when it is not excluded and externally reachable.
pub fn function_included(f: &FunctionDecl, sets: &DirectiveSets) -> bool {
    if sets.include.contains(&f.name) {
        return true;
    }
    !sets.exclude.contains(&f.name) && f.visibility.is_exposed()
}

/// Events and errors default to included; only an exclude directive removes
/// them.
pub fn member_included(name: &str, sets: &DirectiveSets) -> bool {
    !sets.exclude.contains(name)
}

/// A variable gets a synthesized getter when named in the getter set, or
/// when public and not excluded.
pub fn variable_gets_getter(v: &VariableDecl, sets: &DirectiveSets) -> bool {
    if sets.getter.contains(&v.name) {
        return true;
    }
    v.visibility == Visibility::Public && !sets.exclude.contains(&v.name)
}

// ---------------------------------------------------------------------------
// Inheritance rewriting
// ---------------------------------------------------------------------------

/// Output base list: original bases minus removals, through the replace
/// map, followed by every `is` addition in directive order (duplicates
/// kept). Empty result means no `is` clause at all.
pub fn rewrite_inheritance(header: &ContractHeader, sets: &DirectiveSets) -> Vec<String> {
    let mut bases = Vec::new();
    for base in &header.bases {
        if sets.remove.contains(base) {
            continue;
        }
        match sets.replace.get(base) {
            Some(replacement) => bases.push(replacement.clone()),
            None => bases.push(base.clone()),
        }
    }
    bases.extend(sets.is_additions.iter().cloned());
    bases
}

// ---------------------------------------------------------------------------
// Member rendering
// ---------------------------------------------------------------------------

/// Synthesize the getter declaration for a state variable. Constant and
/// immutable variables render `pure`, everything else `view`. Substitution
/// runs over the whole rendered line.
pub fn render_getter(v: &VariableDecl, sets: &DirectiveSets) -> String {
    let mutability = if v.constant { "pure" } else { "view" };
    let line = match &v.ty {
        VarType::Scalar(ty) => {
            format!("function {}() external {} returns ({});", v.name, mutability, ty)
        }
        VarType::Mapping { key, value } => {
            format!("function {}({} key) external {} returns ({});", v.name, key, mutability, value)
        }
    };
    substitute(&line, &sets.replace)
}

/// Render a function declaration. Interfaces only declare externally
/// callable members, so `public` is promoted to `external`; the mutability
/// suffix is kept unless it was the default.
pub fn render_function(f: &FunctionDecl, sets: &DirectiveSets) -> String {
    let mut line = format!("function {}({}) external", f.name, substitute(&f.params, &sets.replace));
    if let Some(suffix) = f.mutability.suffix() {
        line.push(' ');
        line.push_str(suffix);
    }
    if let Some(ret) = &f.returns {
        line.push_str(" returns (");
        line.push_str(&substitute(ret, &sets.replace));
        line.push(')');
    }
    line.push(';');
    line
}

fn push_doc(out: &mut String, doc: &[String], indent: &str) {
    for line in doc {
        if line.is_empty() {
            out.push('\n');
        } else if line.starts_with('*') {
            // re-align block continuation lines under the opener
            out.push_str(indent);
            out.push(' ');
            out.push_str(line);
            out.push('\n');
        } else {
            out.push_str(indent);
            out.push_str(line);
            out.push('\n');
        }
    }
}

// ---------------------------------------------------------------------------
// Assembler
// ---------------------------------------------------------------------------

/// Assemble the final interface text. Fixed order: preamble, copyright,
/// imports, contract doc, interface declaration, events, errors,
/// synthesized getters, functions, closing brace.
pub fn render_interface(gen: &Generator) -> Result<String, GenError> {
    if gen.output_path().is_none() {
        return Err(GenError::MissingBuildDirective);
    }

    let lines: Vec<&str> = gen.source.lines().collect();
    let sets = &gen.sets;
    let mut out = String::with_capacity(gen.source.len() / 2);

    out.push_str(INTERFACE_PREAMBLE);
    out.push('\n');

    if let Some(text) = &sets.copyright {
        out.push_str("// ");
        out.push_str(text);
        out.push('\n');
    }

    if !sets.imports.is_empty() {
        for path in &sets.imports {
            out.push_str("import \"");
            out.push_str(path);
            out.push_str("\";\n");
        }
        out.push('\n');
    }

    push_doc(&mut out, &collect_doc_block(&lines, gen.header.line, gen.marker), "");

    let bases = rewrite_inheritance(&gen.header, sets);
    out.push_str("interface I");
    out.push_str(&gen.header.name);
    if !bases.is_empty() {
        out.push_str(" is ");
        out.push_str(&bases.join(", "));
    }
    out.push_str(" {\n");

    let events: Vec<_> = gen.events.iter().filter(|e| member_included(&e.name, sets)).collect();
    for event in &events {
        push_doc(&mut out, &collect_doc_block(&lines, event.line, gen.marker), MEMBER_INDENT);
        out.push_str(MEMBER_INDENT);
        out.push_str(&substitute(&event.signature, &sets.replace));
        out.push('\n');
    }
    if !events.is_empty() {
        out.push('\n');
    }

    let errors: Vec<_> = gen.errors.iter().filter(|e| member_included(&e.name, sets)).collect();
    for error in &errors {
        push_doc(&mut out, &collect_doc_block(&lines, error.line, gen.marker), MEMBER_INDENT);
        out.push_str(MEMBER_INDENT);
        out.push_str(&substitute(&error.signature, &sets.replace));
        out.push('\n');
    }
    if !errors.is_empty() {
        out.push('\n');
    }

    let getters: Vec<_> =
        gen.variables.iter().filter(|v| variable_gets_getter(v, sets)).collect();
    for variable in &getters {
        out.push_str(MEMBER_INDENT);
        out.push_str(&render_getter(variable, sets));
        out.push('\n');
    }

    let functions: Vec<_> =
        gen.functions.iter().filter(|f| function_included(f, sets)).collect();
    for function in &functions {
        push_doc(&mut out, &collect_doc_block(&lines, function.line, gen.marker), MEMBER_INDENT);
        out.push_str(MEMBER_INDENT);
        out.push_str(&render_function(function, sets));
        out.push('\n');
    }

    out.push_str("}\n");

    debug!(
        contract = gen.header.name.as_str(),
        events = events.len(),
        errors = errors.len(),
        getters = getters.len(),
        functions = functions.len(),
        "interface assembled"
    );

    Ok(out)
}
