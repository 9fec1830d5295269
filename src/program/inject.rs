//! Static reference analysis over a program.
//!
//! Proves every variable reference defined, materializes values that are
//! used but never shown by inserting implicit show statements immediately
//! before their first use, and renumbers all statement indices (block
//! member lists included) to stay contiguous.

use std::collections::{BTreeMap, BTreeSet};

use crate::foundation::core::{Ident, StatementIndex};
use crate::foundation::error::{ScriptError, ScriptResult};
use crate::program::model::{
    Animatable, Animation, Entity, Extent, Program, Statement, StatementKind, Value,
};

/// Validate references and inject implicit shows.
///
/// Fails fast with [`ScriptError::Reference`] on the first undefined
/// variable. Running the pass on its own output is a no-op.
#[tracing::instrument(skip(program))]
pub fn resolve_dependencies(program: Program) -> ScriptResult<Program> {
    let defined = defined_names(&program);
    let mut shown = shown_names(&program);

    let mut statements = Vec::with_capacity(program.statements.len());
    let mut index_map = BTreeMap::<StatementIndex, StatementIndex>::new();

    for statement in &program.statements {
        for dep in statement_deps(statement, &program) {
            if !defined.contains(&dep) {
                return Err(ScriptError::reference(format!(
                    "undefined variable `{dep}` referenced"
                )));
            }
            if shown.insert(dep.clone()) {
                let index = StatementIndex(statements.len() as u32);
                statements.push(Statement {
                    index,
                    kind: StatementKind::Animation(Animation::implicit_show(dep)),
                });
            }
        }

        let index = StatementIndex(statements.len() as u32);
        index_map.insert(statement.index, index);
        statements.push(Statement {
            index,
            kind: statement.kind.clone(),
        });
    }

    remap_blocks(&mut statements, &index_map)?;
    Ok(Program { statements })
}

/// Names bound by top-level definitions.
fn defined_names(program: &Program) -> BTreeSet<Ident> {
    program
        .statements
        .iter()
        .filter_map(|s| match &s.kind {
            StatementKind::Definition(def) => Some(def.name.clone()),
            _ => None,
        })
        .collect()
}

/// Names already shown by an animation somewhere in the program.
///
/// An animation whose instance is an identifier, or whose instance carries
/// an id of its own, counts as showing that name. Block members are
/// ordinary statements in the global list, so one scan covers them.
fn shown_names(program: &Program) -> BTreeSet<Ident> {
    let mut shown = BTreeSet::new();
    for statement in &program.statements {
        if let StatementKind::Animation(anim) = &statement.kind {
            match &anim.instance {
                Animatable::Ref(name) => {
                    shown.insert(name.clone());
                }
                Animatable::Function(f) => {
                    shown.insert(f.id().clone());
                }
                Animatable::Entity(e) => {
                    shown.insert(e.id().clone());
                }
                // A morph has no id until the evaluator builds its target.
                Animatable::Morph(_) => {}
            }
        }
    }
    shown
}

/// The set of names a statement depends on, in name order.
///
/// Fields that *are* ids or names contribute nothing, and neither do
/// expression trees: a free symbol inside an expression is resolved against
/// the store at evaluation time, not a reference to chase here. A bare
/// identifier instance of an animation is the reference being resolved,
/// not a dependency. Synthetic ids are never dependencies.
fn statement_deps(statement: &Statement, program: &Program) -> BTreeSet<Ident> {
    let mut deps = BTreeSet::new();
    kind_deps(&statement.kind, program, &mut deps);
    deps.retain(|d| !d.is_synthetic());
    deps
}

fn kind_deps(kind: &StatementKind, program: &Program, deps: &mut BTreeSet<Ident>) {
    match kind {
        StatementKind::Definition(def) => {
            if let Value::Entity(e) = &def.value {
                entity_deps(e, deps);
            }
        }
        StatementKind::Animation(anim) => {
            if let Animatable::Entity(e) = &anim.instance {
                entity_deps(e, deps);
            }
        }
        // Member deps are collected through the block so injected shows land
        // before the block header, which evaluates its members eagerly.
        StatementKind::Block(block) => {
            for member in &block.members {
                if let Some(statement) = program.statement_at(*member) {
                    kind_deps(&statement.kind, program, deps);
                }
            }
        }
        StatementKind::Clear(clear) => {
            deps.insert(clear.target.clone());
        }
    }
}

fn entity_deps(entity: &Entity, deps: &mut BTreeSet<Ident>) {
    match entity {
        Entity::Line(e) => extent_deps(&e.extent, deps),
        Entity::Arrow(e) => extent_deps(&e.extent, deps),
        Entity::Brace(e) => extent_deps(&e.extent, deps),
        Entity::SweepDot(e) => {
            deps.insert(e.target.clone());
        }
        Entity::VLines(e) => {
            deps.insert(e.target.clone());
        }
        Entity::Morph(e) => {
            deps.insert(e.from.clone());
        }
        _ => {}
    }
    if let Some(anchor) = entity.position().and_then(|p| p.anchor()) {
        deps.insert(anchor.clone());
    }
}

fn extent_deps(extent: &Extent, deps: &mut BTreeSet<Ident>) {
    if let Extent::Between { from, to } = extent {
        deps.insert(from.clone());
        deps.insert(to.clone());
    }
}

/// Rewrite block member index lists through the old → new index mapping.
fn remap_blocks(
    statements: &mut [Statement],
    index_map: &BTreeMap<StatementIndex, StatementIndex>,
) -> ScriptResult<()> {
    for statement in statements {
        if let StatementKind::Block(block) = &mut statement.kind {
            for member in &mut block.members {
                *member = *index_map.get(member).ok_or_else(|| {
                    ScriptError::structure(format!(
                        "block `{}` references missing statement index {member}",
                        block.id
                    ))
                })?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/program/inject.rs"]
mod tests;
