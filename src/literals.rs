//! Composite-literal normalization.
//!
//! Name-tagged literals are reordered to the canonical member order of
//! their type; purely positional literals can be rewritten into name-tagged
//! form first (a configurable policy — positional values bind to the
//! member order as written in the source, so conversion must run before
//! the fields themselves are normalized). Member order flows into nested
//! literals from the enclosing context: struct field, slice/array element,
//! or map value type. Literals of types this file does not declare are
//! left exactly as written.

use std::collections::HashMap;

use crate::ast::*;

/// Reorders name-tagged entries of every known-typed literal into the
/// canonical member order in `defs`.
pub fn reorder_struct_literals(file: &mut File, defs: &HashMap<String, Vec<String>>) {
    struct Reorder<'a> {
        defs: &'a HashMap<String, Vec<String>>,
    }

    impl MutVisitor for Reorder<'_> {
        fn visit_expr(&mut self, expr: &mut Expr) -> bool {
            if let Expr::Composite(lit) = expr {
                reorder_composite_recursive(lit, None, self.defs);
                return false;
            }
            true
        }
    }

    walk_file(file, &mut Reorder { defs });
}

fn reorder_composite_recursive(
    lit: &mut CompositeLit,
    inherited: Option<&[String]>,
    defs: &HashMap<String, Vec<String>>,
) {
    if let Some(order) = resolve_member_order(lit.ty.as_ref(), inherited, defs) {
        reorder_composite_elems(lit, &order);
    }

    let child_order = element_member_order(lit.ty.as_ref(), defs);
    for elem in &mut lit.elems {
        if let Expr::Composite(child) = &mut elem.value {
            reorder_composite_recursive(child, child_order.as_deref(), defs);
        }
    }
}

fn reorder_composite_elems(lit: &mut CompositeLit, order: &[String]) {
    if lit.elems.is_empty() {
        return;
    }

    let mut keyed: Vec<(String, LitElem)> = Vec::new();
    let mut rest: Vec<LitElem> = Vec::new();
    for elem in lit.elems.drain(..) {
        match &elem.key {
            Some(Expr::Ident(name)) => keyed.push((name.clone(), elem)),
            _ => rest.push(elem),
        }
    }

    if keyed.is_empty() {
        lit.elems = rest;
        return;
    }

    let mut result = Vec::with_capacity(keyed.len() + rest.len());
    for name in order {
        if let Some(pos) = keyed.iter().position(|(n, _)| n == name) {
            result.push(keyed.remove(pos).1);
        }
    }
    // Entries with no canonical slot keep their original relative order.
    result.extend(keyed.into_iter().map(|(_, elem)| elem));
    result.extend(rest);
    lit.elems = result;
}

/// Rewrites purely positional literals of locally-declared types into
/// name-tagged form, using the source member order in `source_orders`.
pub fn convert_positional_to_keyed(file: &mut File, source_orders: &HashMap<String, Vec<String>>) {
    struct Convert<'a> {
        orders: &'a HashMap<String, Vec<String>>,
    }

    impl MutVisitor for Convert<'_> {
        fn visit_expr(&mut self, expr: &mut Expr) -> bool {
            if let Expr::Composite(lit) = expr {
                convert_composite_recursive(lit, None, self.orders);
                return false;
            }
            true
        }
    }

    walk_file(file, &mut Convert { orders: source_orders });
}

fn convert_composite_recursive(
    lit: &mut CompositeLit,
    inherited: Option<&[String]>,
    orders: &HashMap<String, Vec<String>>,
) {
    if let Some(names) = resolve_member_order(lit.ty.as_ref(), inherited, orders) {
        if is_positional(lit) && lit.elems.len() <= names.len() {
            for (elem, name) in lit.elems.iter_mut().zip(&names) {
                elem.key = Some(Expr::Ident(name.clone()));
            }
        }
    }

    let child_order = element_member_order(lit.ty.as_ref(), orders);
    for elem in &mut lit.elems {
        if let Expr::Composite(child) = &mut elem.value {
            convert_composite_recursive(child, child_order.as_deref(), orders);
        }
    }
}

fn is_positional(lit: &CompositeLit) -> bool {
    !lit.elems.is_empty() && lit.elems.iter().all(|e| e.key.is_none())
}

/// Member order for a literal: its own type when known, otherwise whatever
/// the enclosing container implies. Anonymous struct types carry their
/// order directly; foreign named types resolve to nothing.
fn resolve_member_order(
    ty: Option<&TypeExpr>,
    inherited: Option<&[String]>,
    defs: &HashMap<String, Vec<String>>,
) -> Option<Vec<String>> {
    match ty {
        None => inherited.map(<[String]>::to_vec),
        Some(TypeExpr::Struct(st)) => Some(crate::structs::field_names_of(st)),
        Some(other) => extract_type_name(other).and_then(|name| defs.get(name).cloned()),
    }
}

/// Order to hand down to untyped child literals: the element type of a
/// slice/array or the value type of a map.
fn element_member_order(
    ty: Option<&TypeExpr>,
    defs: &HashMap<String, Vec<String>>,
) -> Option<Vec<String>> {
    match ty {
        Some(TypeExpr::Slice(elem)) | Some(TypeExpr::Array(_, elem)) => {
            resolve_member_order(Some(&**elem), None, defs)
        }
        Some(TypeExpr::Map(_, value)) => resolve_member_order(Some(&**value), None, defs),
        _ => None,
    }
}
