use std::cell::RefCell;
use std::io;
use std::path::PathBuf;

use tempo_reasoner::{Config, EngineError, Reasoner};
use tempo_solver::{Engine, OnUnsatisfiable, SolveRequest, Transcript};
use tempo_syntax::{answer, fluent, rule, ActionSet, AnswerSet, Rule};
use tempo_tracer::Trace;

#[derive(Clone, Debug, Eq, PartialEq)]
struct Request {
    program: String,
    steps: (u32, u32),
    label: String,
    answers: u32,
    use_copy_files: bool,
}

/// Answers every request with the same canned output.
struct Scripted {
    output: Option<String>,
    requests: RefCell<Vec<Request>>,
}

impl Scripted {
    fn new(output: &str) -> Self {
        Self {
            output: Some(String::from(output)),
            requests: RefCell::new(vec![]),
        }
    }

    fn missing() -> Self {
        Self {
            output: None,
            requests: RefCell::new(vec![]),
        }
    }

    fn last(&self) -> Request {
        self.requests
            .borrow()
            .last()
            .cloned()
            .expect("no engine run")
    }
}

impl Engine for Scripted {
    fn solve(&self, request: &SolveRequest<'_>) -> Result<Transcript, EngineError> {
        self.requests.borrow_mut().push(Request {
            program: String::from(request.program),
            steps: (request.initial_step, request.final_step),
            label: String::from(request.label),
            answers: request.answers,
            use_copy_files: request.use_copy_files,
        });
        match &self.output {
            Some(text) => Ok(Transcript {
                output_path: PathBuf::from(format!("{}_output.txt", request.label)),
                text: text.clone(),
            }),
            None => Err(EngineError::Spawn {
                command: String::from("clingo"),
                source: io::Error::new(io::ErrorKind::NotFound, "not found"),
            }),
        }
    }
}

fn reasoner(output: &str) -> Reasoner<Scripted> {
    let config = Config {
        actions: ["go", "open"].into_iter().collect::<ActionSet>(),
        ..Config::default()
    };
    Reasoner::with_engine(config, Scripted::new(output), Trace::none())
}

fn goal() -> Vec<Rule> {
    vec![Rule::constraint([fluent!(at(kitchen))])]
}

const PLANS: &str = "\
Solving...
Answer: 1
go(hall,1) at(hall,1) go(kitchen,2) at(kitchen,2)
Answer: 2
open(d1,1) go(kitchen,2) at(kitchen,2)
Answer: 3
go(kitchen,1) at(kitchen,1)
SATISFIABLE
";

#[test]
fn minimal_plans() {
    let reasoner = reasoner(PLANS);
    let plans = reasoner.minimal_plan_query(&goal(), true, 5, 3).unwrap();
    assert_eq!(
        plans,
        [
            answer![fluent!(go(hall) @ 1), fluent!(go(kitchen) @ 2)],
            answer![fluent!(open(d1) @ 1), fluent!(go(kitchen) @ 2)],
            answer![fluent!(go(kitchen) @ 1)],
        ]
    );
    assert_eq!(
        reasoner.engine().last(),
        Request {
            program: String::from(
                "#program check(n).\n#external query(n).\n:- at(kitchen,n), query(n).\n\n"
            ),
            steps: (0, 5),
            label: String::from("planQuery"),
            answers: 3,
            use_copy_files: true,
        }
    );
}

#[test]
fn unprojected_plans() {
    let reasoner = reasoner(PLANS);
    let plans = reasoner.minimal_plan_query(&goal(), false, 5, 0).unwrap();
    assert_eq!(plans.len(), 3);
    assert_eq!(plans[2], answer![fluent!(go(kitchen) @ 1), fluent!(at(kitchen) @ 1)]);
}

#[test]
fn length_range_plans() {
    let reasoner = reasoner(PLANS);
    let plans = reasoner
        .length_range_plan_query(&goal(), true, 2, 4, 0)
        .unwrap();
    assert_eq!(
        plans,
        [
            answer![fluent!(go(hall) @ 1), fluent!(go(kitchen) @ 2)],
            answer![fluent!(open(d1) @ 1), fluent!(go(kitchen) @ 2)],
        ]
    );
    let request = reasoner.engine().last();
    assert_eq!(request.steps, (4, 4));
    assert_eq!(request.label, "planQuery");
}

#[test]
fn unsatisfiable_plans() {
    let reasoner = reasoner("Solving...\nUNSATISFIABLE\n");
    assert!(reasoner
        .minimal_plan_query(&goal(), true, 5, 0)
        .unwrap()
        .is_empty());
}

#[test]
fn late_unsatisfiable() {
    let output = "Answer: 1\ngo(kitchen,1) at(kitchen,1)\nUNSATISFIABLE\n";
    let config = Config {
        on_unsatisfiable: OnUnsatisfiable::KeepFound,
        ..Config::default()
    };
    let reasoner = Reasoner::with_engine(config, Scripted::new(output), Trace::none());
    assert!(reasoner
        .minimal_plan_query(&goal(), false, 5, 0)
        .unwrap()
        .is_empty());
    assert!(reasoner.monitor_query(&goal(), &AnswerSet::new()).unwrap().is_empty());
    assert_eq!(reasoner.query("", 1).unwrap().len(), 1);

    let reasoner = self::reasoner(output);
    assert!(reasoner.query("", 1).unwrap().is_empty());
}

const COSTS: &str = "\
Answer: 1
go(hall,1) at(hall,1) go(kitchen,2) at(kitchen,2)
Optimization: 4
Answer: 2
go(kitchen,1) at(kitchen,1)
Optimization: 2
OPTIMUM FOUND
";

#[test]
fn optimal_plans() {
    let reasoner = reasoner(COSTS);
    assert_eq!(
        reasoner.optimal_plan_query(&goal(), true, 3, 0, true).unwrap(),
        answer![fluent!(go(kitchen) @ 1)]
    );
    assert_eq!(
        reasoner.optimal_plan_query(&goal(), true, 3, 0, false).unwrap(),
        answer![fluent!(go(hall) @ 1), fluent!(go(kitchen) @ 2)]
    );
    assert_eq!(reasoner.engine().last().steps, (3, 3));
}

#[test]
fn current_state() {
    let reasoner = reasoner("Answer: 1\nat(hall,0) closed(d1,0)\nSATISFIABLE\n");
    let state = reasoner
        .current_state_query(&[
            rule!([fluent!(at(hall) @ 3)]),
            Rule::constraint([fluent!(open(d1))]),
        ])
        .unwrap();
    assert_eq!(
        state,
        answer![fluent!(at(hall) @ 0), fluent!(closed(d1) @ 0)]
    );
    assert_eq!(
        reasoner.engine().last(),
        Request {
            program: String::from("at(hall,0).\n:- open(d1,0).\n"),
            steps: (0, 0),
            label: String::from("stateQuery"),
            answers: 1,
            use_copy_files: true,
        }
    );

    let reasoner = self::reasoner("UNSATISFIABLE\n");
    assert_eq!(reasoner.current_state_query(&[]).unwrap(), AnswerSet::new());
}

#[test]
fn generic_queries() {
    let reasoner = reasoner("Answer: 1\nat(hall,0) at(kitchen,1)\n");
    let answers = reasoner
        .generic_query(
            &[
                rule!([fluent!(at(hall) @ 0)]),
                rule!([fluent!(at(kitchen) @ 1)], [fluent!(go(kitchen) @ 1)]),
            ],
            1,
            "explore",
            0,
        )
        .unwrap();
    assert_eq!(answers.len(), 1);
    let request = reasoner.engine().last();
    assert_eq!(request.steps, (1, 1));
    assert_eq!(request.label, "explore");
    assert_eq!(
        request.program,
        "#program base.\nat(hall,0).\n\n\
         #program step(n).\nat(kitchen,n):- go(kitchen,1), n=1.\n\n"
    );
}

#[test]
fn atom_queries() {
    let reasoner = reasoner("Answer: 1\nroom(hall) room(kitchen) -door(d1)\n");
    let groups = reasoner.query("room(hall). room(kitchen).", 0).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(
        groups[0].iter().map(ToString::to_string).collect::<Vec<_>>(),
        ["room(hall)", "room(kitchen)", "-door(d1)"]
    );
    let request = reasoner.engine().last();
    assert_eq!(request.steps, (0, 0));
    assert_eq!(request.answers, 0);
}

#[test]
fn monitoring() {
    let plan = answer![fluent!(go(hall) @ 1), fluent!(go(kitchen) @ 2)];
    let reasoner = reasoner(PLANS);
    let answers = reasoner.monitor_query(&goal(), &plan).unwrap();
    assert_eq!(answers.len(), 2, "the one-step answer is too short");
    assert!(reasoner.is_plan_valid(&goal(), &plan).unwrap());

    let request = reasoner.engine().last();
    assert_eq!(request.steps, (2, 2));
    assert_eq!(request.label, "monitorQuery");
    assert_eq!(request.answers, 1);
    assert!(request
        .program
        .ends_with("#program step(n).\ngo(hall,n):- n=1.\ngo(kitchen,n):- n=2.\n"));

    let reasoner = self::reasoner("UNSATISFIABLE\n");
    assert!(!reasoner.is_plan_valid(&goal(), &plan).unwrap());
}

#[test]
fn filtering() {
    let output = "\
Answer: 1
closed(d1,0) at(hall,0)
Optimization: 2
Answer: 2
at(hall,0)
Optimization: 1
OPTIMUM FOUND
";
    let reasoner = reasoner(output);
    let state = answer![fluent!(closed(d1) @ 0), fluent!(at(hall) @ 0)];
    let plan = answer![fluent!(go(kitchen) @ 1)];
    assert_eq!(
        reasoner.filtering_query(&state, &plan, &goal()).unwrap(),
        answer![fluent!(at(hall) @ 0)]
    );

    let request = reasoner.engine().last();
    assert_eq!(request.label, "filterState");
    assert_eq!(request.steps, (1, 1));
    assert_eq!(request.answers, 0);
    assert!(!request.use_copy_files);
    assert!(request
        .program
        .starts_with("#program base.\n0{closed(d1,0)}1.\n0{at(hall,0)}1.\n"));
    assert!(request.program.contains(":~ at(hall,0). [1,at(hall,0)]\n"));
}

#[test]
fn optimization() {
    let reasoner = reasoner(COSTS);
    assert_eq!(
        reasoner.optimization_query("{ p(1,0) }.", "cheapest").unwrap(),
        answer![fluent!(go(kitchen) @ 1), fluent!(at(kitchen) @ 1)]
    );
    let request = reasoner.engine().last();
    assert_eq!(request.steps, (0, 0));
    assert_eq!(request.label, "cheapest");
}

#[test]
fn engine_failure() {
    let reasoner = Reasoner::with_engine(Config::default(), Scripted::missing(), Trace::none());
    assert!(matches!(
        reasoner.minimal_plan_query(&goal(), false, 3, 0),
        Err(EngineError::Spawn { .. })
    ));
    assert!(reasoner.is_plan_valid(&goal(), &AnswerSet::new()).is_err());
}
