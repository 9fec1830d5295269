use crate::eval::evaluator::Evaluator;
use crate::foundation::error::ScriptResult;
use crate::program::inject::resolve_dependencies;
use crate::program::model::Program;
use crate::scene::graph::SceneGraph;
use crate::scene::plan::AnimationPlan;

/// Run a program through the whole core: injection pass, evaluation, scene
/// resolution, and plan assembly.
///
/// The returned plan is what the external rendering engine plays; a failed
/// run produces no plan at all.
#[tracing::instrument(skip(program))]
pub fn compile_program(program: Program) -> ScriptResult<AnimationPlan> {
    let program = resolve_dependencies(program)?;

    let mut evaluator = Evaluator::new(program);
    let entities = evaluator.run()?;

    let mut graph = SceneGraph::new();
    for entity in entities {
        graph.insert(entity)?;
    }
    graph.resolve()?;
    Ok(graph.into_plan())
}
