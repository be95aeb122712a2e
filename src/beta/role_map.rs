//! The documented DEP→role mapping table driving role assignment for a
//! `P`-edge's direct arguments (spec §4.5 "Role assignment").
//!
//! Only an argument that is itself an atom can carry a role code
//! (`hypergraph_ast::Atom::role_code`); a composite argument (e.g. a
//! trigger-built specifier) is attached without a role annotation, since
//! roles are not a field of [`hypergraph_ast::Hyperedge::Edge`].

use hypergraph_ast::RoleCode;

/// Map a dependency-relation label to the predicate-argument role it
/// implies, or `None` if that relation does not assign a direct-argument
/// role (e.g. `prep`, which is consumed by trigger-wrapping instead).
#[must_use]
pub fn role_for_dep(dep: &str) -> Option<RoleCode> {
    match dep {
        "nsubj" | "nsubjpass:xsubj" | "csubj" => Some(RoleCode::Subject),
        "nsubjpass" => Some(RoleCode::PassiveSubject),
        "agent" => Some(RoleCode::Agent),
        "attr" | "acomp" | "oprd" => Some(RoleCode::Complement),
        "dobj" | "obj" => Some(RoleCode::Object),
        "iobj" | "dative" => Some(RoleCode::IndirectObject),
        "npadvmod" | "tmod" => Some(RoleCode::Topic),
        "conj" => Some(RoleCode::Conjunctive),
        "xcomp" | "ccomp" | "advcl" => Some(RoleCode::Extra),
        "relcl" | "acl:relcl" => Some(RoleCode::Relative),
        _ => None,
    }
}
