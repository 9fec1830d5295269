use std::collections::BTreeSet;

use crate::expression::ast::Expr;
use crate::foundation::core::{Ident, StatementIndex};
use crate::foundation::error::{ScriptError, ScriptResult};
use crate::foundation::math::sampled_range;
use crate::program::model::{
    Animatable, Animation, Block, BlockKind, Entity, MathFunction, MorphExpr, ObjectTransform,
    ParametricFunction, PolarFunction, Program, RegularFunction, Statement, StatementKind,
    Transform, Value,
};
use crate::store::SymbolStore;

/// A concrete, renderable value tagged with the statement that produced it.
#[derive(Clone, Debug, serde::Serialize)]
pub struct EvaluatedEntity {
    /// The producing statement's index.
    pub index: StatementIndex,
    /// The produced value.
    pub value: Evaluated,
}

impl EvaluatedEntity {
    /// The entity's id, when it has one (clear commands do not).
    pub fn id(&self) -> Option<&Ident> {
        match &self.value {
            Evaluated::Plot(plot) => Some(plot.function.id()),
            Evaluated::Entity(entity) => Some(entity.id()),
            Evaluated::Group(group) => Some(&group.id),
            Evaluated::Clear(_) => None,
        }
    }
}

/// What evaluating one statement can produce.
#[derive(Clone, Debug, serde::Serialize)]
pub enum Evaluated {
    /// A function refined against a sweep, ready to plot.
    Plot(Plot),
    /// A directly renderable entity, passed through.
    Entity(Entity),
    /// A block container together with its evaluated members.
    Group(Group),
    /// A request to remove an entity from view.
    Clear(Ident),
}

/// A refined function plus its decoration flags.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Plot {
    /// The function with domain and sampled range(s) filled in.
    pub function: MathFunction,
    /// Whether a tracked dot was requested along the curve.
    pub tracked_dot: bool,
}

/// An evaluated block: the container and its member entities.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Group {
    /// The container's id.
    pub id: Ident,
    /// The container kind.
    pub kind: BlockKind,
    /// Member entities in declaration order.
    pub members: Vec<EvaluatedEntity>,
}

/// Steps through an injected program, producing scene entities in
/// program order.
#[derive(Debug)]
pub struct Evaluator {
    program: Program,
    store: SymbolStore,
    cursor: usize,
    /// Statements owned by a block; the sequential walk skips them and the
    /// owning block evaluates them instead.
    owned: BTreeSet<StatementIndex>,
    /// Ids already emitted to the scene, for clear-command checks.
    shown: BTreeSet<Ident>,
}

impl Evaluator {
    /// Build an evaluator over a validated program.
    pub fn new(program: Program) -> Self {
        let owned = program
            .statements
            .iter()
            .filter_map(|s| match &s.kind {
                StatementKind::Block(block) => Some(block.members.clone()),
                _ => None,
            })
            .flatten()
            .collect();
        Self {
            program,
            store: SymbolStore::new(),
            cursor: 0,
            owned,
            shown: BTreeSet::new(),
        }
    }

    /// The symbol store, for inspection.
    pub fn store(&self) -> &SymbolStore {
        &self.store
    }

    /// Evaluate the whole program.
    #[tracing::instrument(skip(self))]
    pub fn run(&mut self) -> ScriptResult<Vec<EvaluatedEntity>> {
        let mut entities = Vec::new();
        while self.cursor < self.program.statements.len() {
            let statement = self.program.statements[self.cursor].clone();
            self.cursor += 1;
            if self.owned.contains(&statement.index) {
                continue;
            }
            if let Some(entity) = self.execute(&statement)? {
                self.mark_shown(&entity);
                entities.push(entity);
            }
        }
        Ok(entities)
    }

    fn execute(&mut self, statement: &Statement) -> ScriptResult<Option<EvaluatedEntity>> {
        match &statement.kind {
            StatementKind::Definition(def) => {
                self.store.bind(def.name.clone(), def.value.clone());
                Ok(None)
            }
            StatementKind::Animation(anim) => {
                self.animate(anim, statement.index, None).map(Some)
            }
            StatementKind::Block(block) => self.eval_block(block, statement.index).map(Some),
            StatementKind::Clear(clear) => {
                if !self.shown.contains(&clear.target) {
                    return Err(ScriptError::reference(format!(
                        "cannot clear `{}`: it was never shown",
                        clear.target
                    )));
                }
                Ok(Some(EvaluatedEntity {
                    index: statement.index,
                    value: Evaluated::Clear(clear.target.clone()),
                }))
            }
        }
    }

    fn animate(
        &mut self,
        anim: &Animation,
        index: StatementIndex,
        id_hint: Option<Ident>,
    ) -> ScriptResult<EvaluatedEntity> {
        match &anim.instance {
            Animatable::Function(function) => {
                self.eval_function(function.clone(), &anim.transforms, id_hint, index)
            }
            Animatable::Ref(name) => {
                let value = self.store.get_or_err(name)?.clone();
                match value {
                    Value::Function(function) => self.eval_function(
                        function,
                        &anim.transforms,
                        Some(name.clone()),
                        index,
                    ),
                    Value::Entity(entity) => Ok(EvaluatedEntity {
                        index,
                        value: Evaluated::Entity(entity),
                    }),
                    Value::Number(_) => Err(ScriptError::structure(format!(
                        "cannot show `{name}`: it is bound to a number"
                    ))),
                }
            }
            Animatable::Morph(morph) => self.eval_morph(morph, index),
            Animatable::Entity(entity) => Ok(EvaluatedEntity {
                index,
                value: Evaluated::Entity(entity.clone()),
            }),
        }
    }

    /// Refine a function against its sweep: substitute numeric bindings,
    /// fix the domain, and sample the value range(s).
    fn eval_function(
        &self,
        function: MathFunction,
        transforms: &[Transform],
        id_hint: Option<Ident>,
        index: StatementIndex,
    ) -> ScriptResult<EvaluatedEntity> {
        let sweep = match transforms.first() {
            Some(Transform::Sweep(range)) => *range,
            _ => {
                return Err(ScriptError::structure(format!(
                    "showing function `{}` requires a sweep range",
                    function.id()
                )));
            }
        };
        let domain = sweep.nudged();
        let tracked_dot = transforms
            .iter()
            .any(|t| matches!(t, Transform::SweepDot));

        let sweep_var = function
            .variables()
            .first()
            .cloned()
            .ok_or_else(|| {
                ScriptError::structure(format!(
                    "function `{}` declares no sweep variable",
                    function.id()
                ))
            })?;

        let mut function = function;
        match &mut function {
            MathFunction::Regular(f) => {
                let expression = self.substitute_stored(&f.expression);
                let range = sampled_range(domain, |x| expression.eval_at(&sweep_var, x))?;
                f.expression = expression;
                f.domain = Some(domain);
                f.range = Some(range);
            }
            MathFunction::Polar(f) => {
                let expression = self.substitute_stored(&f.expression);
                let range = sampled_range(domain, |theta| expression.eval_at(&sweep_var, theta))?;
                f.expression = expression;
                f.domain = Some(domain);
                f.range = Some(range);
            }
            MathFunction::Parametric(f) => {
                if f.expressions.len() != 2 {
                    return Err(ScriptError::structure(format!(
                        "parametric function `{}` requires an x and a y component",
                        f.id
                    )));
                }
                let expressions: Vec<Expr> = f
                    .expressions
                    .iter()
                    .map(|e| self.substitute_stored(e))
                    .collect();
                let x_range = sampled_range(domain, |t| expressions[0].eval_at(&sweep_var, t))?;
                let y_range = sampled_range(domain, |t| expressions[1].eval_at(&sweep_var, t))?;
                f.expressions = expressions;
                f.domain = Some(domain);
                f.x_range = Some(x_range);
                f.y_range = Some(y_range);
            }
        }

        if let Some(id) = id_hint {
            function = function.with_id(id);
        }
        Ok(EvaluatedEntity {
            index,
            value: Evaluated::Plot(Plot {
                function,
                tracked_dot,
            }),
        })
    }

    /// Substitute every free variable bound to a *numeric* value.
    ///
    /// Variables bound to non-numeric values stay symbolic; they are
    /// combined later through a morph, not here.
    fn substitute_stored(&self, expression: &Expr) -> Expr {
        let mut out = expression.clone();
        for var in expression.free_vars() {
            if let Some(Value::Number(n)) = self.store.get(&var) {
                out = out.subs_num(&var, *n);
            }
        }
        out
    }

    fn eval_morph(&mut self, morph: &MorphExpr, index: StatementIndex) -> ScriptResult<EvaluatedEntity> {
        let from_name = morph
            .from
            .as_var()
            .ok_or_else(|| {
                ScriptError::type_error("morph source must be a bound function name")
            })?
            .clone();
        let from_fn = match self.store.get_or_err(&from_name)? {
            Value::Function(f) => f.clone(),
            _ => {
                return Err(ScriptError::type_error(format!(
                    "cannot morph `{from_name}`: it is not bound to a function"
                )));
            }
        };

        let expected = match &from_fn {
            MathFunction::Parametric(_) => 2,
            _ => 1,
        };
        if morph.to.len() != expected {
            return Err(ScriptError::type_error(format!(
                "morph target for `{from_name}` needs {expected} component(s), got {}",
                morph.to.len()
            )));
        }

        let combined: Vec<Expr> = morph
            .to
            .iter()
            .enumerate()
            .map(|(component, expr)| self.combine_stored(expr, &from_fn, &from_name, component))
            .collect::<ScriptResult<_>>()?;

        let target_id = Ident::synthetic(format!("{from_name}::target"));
        let variables = from_fn.variables().to_vec();
        let mut combined = combined.into_iter();
        let to_fn = match &from_fn {
            MathFunction::Regular(_) => MathFunction::Regular(RegularFunction {
                id: target_id,
                variables,
                expression: combined.next().expect("one component"),
                domain: None,
                range: None,
            }),
            MathFunction::Polar(_) => MathFunction::Polar(PolarFunction {
                id: target_id,
                variables,
                expression: combined.next().expect("one component"),
                domain: None,
                range: None,
            }),
            MathFunction::Parametric(_) => MathFunction::Parametric(ParametricFunction {
                id: target_id,
                variables,
                expressions: combined.collect(),
                domain: None,
                x_range: None,
                y_range: None,
            }),
        };

        // Future references to the source name see the transformed
        // definition: replace the binding, never mutate shared structure.
        self.store
            .bind(from_name.clone(), Value::Function(to_fn.clone()));

        Ok(EvaluatedEntity {
            index,
            value: Evaluated::Entity(Entity::Morph(ObjectTransform {
                id: Ident::synthetic(format!("morph-{index}")),
                from: from_name,
                to: to_fn,
            })),
        })
    }

    /// Resolve a morph-target expression against the store.
    ///
    /// Numeric bindings substitute as numbers. Function bindings must all
    /// match the source function's concrete kind; their expressions are
    /// spliced in with their sweep variable renamed to the source's.
    fn combine_stored(
        &self,
        expression: &Expr,
        from_fn: &MathFunction,
        from_name: &Ident,
        component: usize,
    ) -> ScriptResult<Expr> {
        let sweep_var = from_fn.variables().first().cloned();
        let mut out = expression.clone();
        for var in expression.free_vars() {
            match self.store.get(&var) {
                Some(Value::Number(n)) => out = out.subs_num(&var, *n),
                Some(Value::Function(g)) => {
                    if std::mem::discriminant(g) != std::mem::discriminant(from_fn) {
                        return Err(ScriptError::type_error(format!(
                            "cannot combine `{var}` with `{from_name}`: the stored \
                             functions are of different kinds"
                        )));
                    }
                    let mut spliced = match g {
                        MathFunction::Regular(g) => g.expression.clone(),
                        MathFunction::Polar(g) => g.expression.clone(),
                        MathFunction::Parametric(g) => g
                            .expressions
                            .get(component)
                            .cloned()
                            .ok_or_else(|| {
                                ScriptError::structure(format!(
                                    "parametric function `{var}` is missing component {component}"
                                ))
                            })?,
                    };
                    if let (Some(target), Some(source)) =
                        (sweep_var.as_ref(), g.variables().first())
                        && source != target
                    {
                        spliced = spliced.subs(source, &Expr::Var(target.clone()));
                    }
                    out = out.subs(&var, &spliced);
                }
                // Unbound or entity-bound symbols stay symbolic; sampling
                // reports them if they survive to a sweep.
                _ => {}
            }
        }
        Ok(out)
    }

    fn eval_block(&mut self, block: &Block, index: StatementIndex) -> ScriptResult<EvaluatedEntity> {
        let mut members = Vec::new();
        for member_index in &block.members {
            let statement = self
                .program
                .statement_at(*member_index)
                .ok_or_else(|| {
                    ScriptError::structure(format!(
                        "block `{}` references missing statement index {member_index}",
                        block.id
                    ))
                })?
                .clone();
            let anim = match &statement.kind {
                StatementKind::Animation(anim) => anim.clone(),
                _ => {
                    return Err(ScriptError::structure(format!(
                        "only show statements may appear inside block `{}`",
                        block.id
                    )));
                }
            };
            let member = self.animate(&anim, statement.index, None)?;
            self.check_member(block, &member)?;
            members.push(member);
        }
        Ok(EvaluatedEntity {
            index,
            value: Evaluated::Group(Group {
                id: block.id.clone(),
                kind: block.kind,
                members,
            }),
        })
    }

    /// Enforce that a block member fits the container.
    fn check_member(&self, block: &Block, member: &EvaluatedEntity) -> ScriptResult<()> {
        match block.kind {
            BlockKind::Axis | BlockKind::Polar => {
                let Evaluated::Plot(plot) = &member.value else {
                    return Err(ScriptError::structure(format!(
                        "block `{}` members must be plotted functions",
                        block.id
                    )));
                };
                if plot.function.surface() != block.kind.surface() {
                    return Err(ScriptError::type_error(format!(
                        "{} content cannot be plotted in {} block `{}`",
                        plot.function.surface(),
                        block.kind.surface(),
                        block.id
                    )));
                }
            }
            BlockKind::Field => {
                if !matches!(&member.value, Evaluated::Entity(Entity::Charge(_))) {
                    return Err(ScriptError::type_error(format!(
                        "electric field block `{}` may only contain charges",
                        block.id
                    )));
                }
            }
        }
        Ok(())
    }

    fn mark_shown(&mut self, entity: &EvaluatedEntity) {
        if let Some(id) = entity.id() {
            self.shown.insert(id.clone());
        }
        if let Evaluated::Group(group) = &entity.value {
            for member in &group.members {
                if let Some(id) = member.id() {
                    self.shown.insert(id.clone());
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/evaluator.rs"]
mod tests;
