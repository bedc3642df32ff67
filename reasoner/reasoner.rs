//! Answer planning, monitoring, and diagnosis questions about a
//! time-indexed rule set by compiling each one into an incremental
//! engine program and reading back the engine's answers.
//!
//! Every query is a single, blocking engine run. Queries that share a
//! label share output files in the working directory, so callers that
//! run queries concurrently must serialize them.

mod config;

use tempo_compiler::QueryCompiler;
use tempo_solver::{
    filter_actions, prune_shorter_than, read_answer_sets, read_atom_groups,
    read_optimal_answer_set, ClingoEngine, Engine, OnUnsatisfiable, Optimize, QueryDirectory,
    SolveRequest, Transcript,
};
use tempo_syntax::{ActionSet, AnswerSet, Atom, Rule};
use tempo_tracer::*;

pub use config::Config;
pub use tempo_solver::EngineError;

const PLAN: &str = "planQuery";
const STATE: &str = "stateQuery";
const MONITOR: &str = "monitorQuery";
const FILTER: &str = "filterState";

pub struct Reasoner<E = ClingoEngine> {
    compiler: QueryCompiler,
    engine: E,
    actions: ActionSet,
    on_unsatisfiable: OnUnsatisfiable,
    trace: Trace,
}

impl Reasoner<ClingoEngine> {
    /// A reasoner running `clingo` in the configured working directory.
    pub fn new(config: Config, trace: Trace) -> Self {
        let stager = QueryDirectory::new(config.working_directory.clone());
        let engine = ClingoEngine::new(config.engine.clone(), stager, trace);
        Self::with_engine(config, engine, trace)
    }
}

impl<E: Engine> Reasoner<E> {
    pub fn with_engine(config: Config, engine: E, trace: Trace) -> Self {
        Self {
            compiler: QueryCompiler::new(config.incremental_var, trace),
            engine,
            actions: config.actions,
            on_unsatisfiable: config.on_unsatisfiable,
            trace,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn actions(&self) -> &ActionSet {
        &self.actions
    }

    pub fn compiler(&self) -> &QueryCompiler {
        &self.compiler
    }

    fn run(
        &self,
        program: &str,
        steps: (u32, u32),
        label: &str,
        answers: u32,
        use_copy_files: bool,
    ) -> Result<Transcript, EngineError> {
        let (initial_step, final_step) = steps;
        let transcript = self.engine.solve(&SolveRequest {
            program,
            initial_step,
            final_step,
            label,
            answers,
            use_copy_files,
        })?;
        trace!(
            self.trace,
            Invoke,
            "Query {} captured in {}",
            label,
            transcript.output_path.display()
        );
        Ok(transcript)
    }

    fn answer_sets(&self, transcript: &Transcript) -> Vec<AnswerSet> {
        let answers = read_answer_sets(
            &transcript.text,
            OnUnsatisfiable::DiscardFound,
            self.trace,
        );
        trace!(self.trace, Parse, "Read {} answer set(s)", answers.len());
        answers
    }

    fn project(&self, answers: Vec<AnswerSet>, filter: bool) -> Vec<AnswerSet> {
        if filter {
            filter_actions(answers, &self.actions)
        } else {
            answers
        }
    }

    /// Run a complete program over iterations `initial..=final` and read
    /// its answer sets.
    pub fn query_program(
        &self,
        program: &str,
        initial_step: u32,
        final_step: u32,
        label: &str,
        answers: u32,
        use_copy_files: bool,
    ) -> Result<Vec<AnswerSet>, EngineError> {
        let transcript = self.run(
            program,
            (initial_step, final_step),
            label,
            answers,
            use_copy_files,
        )?;
        Ok(self.answer_sets(&transcript))
    }

    /// Compile `rules` into base and step sections and solve them at `step`.
    pub fn generic_query(
        &self,
        rules: &[Rule],
        step: u32,
        label: &str,
        answers: u32,
    ) -> Result<Vec<AnswerSet>, EngineError> {
        let program = self.compiler.program(rules.iter().cloned());
        self.query_program(&program, step, step, label, answers, true)
    }

    /// Solve a program at `step` and read every answer as plain atoms.
    /// Only this reading follows the configured unsatisfiability policy.
    pub fn query_atoms(
        &self,
        program: &str,
        step: u32,
        label: &str,
        answers: u32,
    ) -> Result<Vec<Vec<Atom>>, EngineError> {
        let transcript = self.run(program, (step, step), label, answers, true)?;
        Ok(read_atom_groups(
            &transcript.text,
            self.on_unsatisfiable,
            self.trace,
        ))
    }

    pub fn query(&self, program: &str, step: u32) -> Result<Vec<Vec<Atom>>, EngineError> {
        self.query_atoms(program, step, "query", 0)
    }

    /// What holds now, given `rules` pinned to step 0. Empty if nothing
    /// is consistent with them.
    pub fn current_state_query(&self, rules: &[Rule]) -> Result<AnswerSet, EngineError> {
        let program = self.compiler.state(rules);
        let answers = self.query_program(&program, 0, 0, STATE, 1, true)?;
        Ok(answers.into_iter().next().unwrap_or_default())
    }

    /// Plans of any length up to `max_plan_length` that reach `goal`.
    pub fn minimal_plan_query(
        &self,
        goal: &[Rule],
        filter_actions: bool,
        max_plan_length: u32,
        answers: u32,
    ) -> Result<Vec<AnswerSet>, EngineError> {
        let program = self.compiler.plan(goal);
        let plans = self.query_program(&program, 0, max_plan_length, PLAN, answers, true)?;
        Ok(self.project(plans, filter_actions))
    }

    /// Plans reaching `goal` whose length is within `min..=max`.
    pub fn length_range_plan_query(
        &self,
        goal: &[Rule],
        filter_actions: bool,
        min_plan_length: u32,
        max_plan_length: u32,
        answers: u32,
    ) -> Result<Vec<AnswerSet>, EngineError> {
        let program = self.compiler.plan(goal);
        let plans = self.query_program(
            &program,
            max_plan_length,
            max_plan_length,
            PLAN,
            answers,
            true,
        )?;
        let plans = prune_shorter_than(plans, min_plan_length);
        Ok(self.project(plans, filter_actions))
    }

    /// The cheapest (or dearest) plan reaching `goal`, by the engine's
    /// reported cost.
    pub fn optimal_plan_query(
        &self,
        goal: &[Rule],
        filter_actions: bool,
        max_plan_length: u32,
        answers: u32,
        minimum: bool,
    ) -> Result<AnswerSet, EngineError> {
        let program = self.compiler.plan(goal);
        let transcript = self.run(
            &program,
            (max_plan_length, max_plan_length),
            PLAN,
            answers,
            true,
        )?;
        let plan = read_optimal_answer_set(&transcript.text, Optimize::new(minimum), self.trace);
        Ok(if filter_actions {
            plan.actions(&self.actions)
        } else {
            plan
        })
    }

    /// Replay `plan` one action per step and check that it reaches `goal`.
    pub fn monitor_query(
        &self,
        goal: &[Rule],
        plan: &AnswerSet,
    ) -> Result<Vec<AnswerSet>, EngineError> {
        let len = u32::try_from(plan.len()).unwrap_or(u32::MAX);
        let program = self.compiler.monitor(goal, plan);
        let answers = self.query_program(&program, len, len, MONITOR, 1, true)?;
        Ok(prune_shorter_than(answers, len))
    }

    pub fn is_plan_valid(&self, goal: &[Rule], plan: &AnswerSet) -> Result<bool, EngineError> {
        Ok(!self.monitor_query(goal, plan)?.is_empty())
    }

    /// The least of `current_state` that must be given up to explain
    /// how `plan` could still reach `goal`.
    pub fn filtering_query(
        &self,
        current_state: &AnswerSet,
        plan: &AnswerSet,
        goal: &[Rule],
    ) -> Result<AnswerSet, EngineError> {
        let len = u32::try_from(plan.len()).unwrap_or(u32::MAX);
        let program = self.compiler.diagnosis(current_state, plan, goal);
        let transcript = self.run(&program, (len, len), FILTER, 0, false)?;
        Ok(read_optimal_answer_set(
            &transcript.text,
            Optimize::Minimize,
            self.trace,
        ))
    }

    /// Solve a program once and keep its cheapest answer.
    pub fn optimization_query(&self, program: &str, label: &str) -> Result<AnswerSet, EngineError> {
        let transcript = self.run(program, (0, 0), label, 0, true)?;
        Ok(read_optimal_answer_set(
            &transcript.text,
            Optimize::Minimize,
            self.trace,
        ))
    }
}
