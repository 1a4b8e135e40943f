use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use botle_config::Config;
use botle_primitives::{Pattern, WordStat};
use botle_rpc::Error;
use botle_thinking::{
	BackOutcome, Dictionary, LaunchError, Launched, MemoryCacheStore, ThinkingSession, ThinkingStatus, launch, launch_with_cache,
};
use botle_worker::testing::ScriptedEngine;
use botle_worker::{Engine, EngineError};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

fn stat(guess: &str, avg: f64, worst: u32, depth: u32) -> WordStat {
	WordStat::new(guess, avg, worst, depth)
}

fn dictionary() -> Dictionary {
	Dictionary::from_word_lists("CRANE\nSLATE\nTRACE\nSALET\n", Some("CRANE\nSLATE\n"), false)
}

fn pattern(marks: &str) -> Pattern {
	marks.parse().unwrap()
}

fn record_selections(session: &ThinkingSession) -> Arc<Mutex<Vec<WordStat>>> {
	let seen = Arc::new(Mutex::new(Vec::new()));
	let sink = Arc::clone(&seen);
	session.on_selection_change(move |leader| sink.lock().push(leader.clone()));
	seen
}

async fn wait_for(session: &ThinkingSession, status: ThinkingStatus) {
	let mut rx = session.subscribe();
	tokio::time::timeout(Duration::from_secs(10), rx.wait_for(|s| *s == status))
		.await
		.expect("timed out waiting for status")
		.unwrap();
}

/// Engine with a fixed cache key that counts search steps.
struct KeyedEngine {
	key: &'static str,
	steps: Arc<AtomicUsize>,
}

impl Engine for KeyedEngine {
	fn load_dict(&mut self, _: &[String], _: &[String], _: bool) -> Result<(), EngineError> {
		Ok(())
	}

	fn compute_next_suggestion(&mut self) -> Result<Option<WordStat>, EngineError> {
		self.steps.fetch_add(1, Ordering::SeqCst);
		Ok(None)
	}

	fn make_guess(&mut self, _: &str, _: Pattern) -> Result<(), EngineError> {
		Ok(())
	}

	fn cache_key(&self) -> String {
		self.key.to_owned()
	}

	fn back(&mut self) -> bool {
		false
	}
}

#[tokio::test]
async fn streamed_results_converge_on_the_refined_leader() {
	let _ = tracing_subscriber::fmt::try_init();
	let script = vec![stat("CRANE", 3.5, 5, 1), stat("CRANE", 3.2, 4, 2), stat("SLATE", 3.6, 6, 1)];
	let Launched { session, worker } = launch(ScriptedEngine::new(script), &Config::default()).unwrap();
	let selections = record_selections(&session);

	session.prepare(dictionary()).await.unwrap();
	wait_for(&session, ThinkingStatus::Done).await;

	let snapshot = session.snapshot();
	assert_eq!(snapshot.leader, Some(stat("CRANE", 3.2, 4, 2)));
	assert_eq!(snapshot.best, vec![stat("CRANE", 3.2, 4, 2), stat("SLATE", 3.6, 6, 1)]);
	assert_eq!(snapshot.thinking_word.as_deref(), Some("SLATE"));
	assert_eq!(*selections.lock(), vec![stat("CRANE", 3.5, 5, 1), stat("CRANE", 3.2, 4, 2)]);

	worker.shutdown().unwrap();
}

#[tokio::test]
async fn cache_hit_skips_the_search() {
	let steps = Arc::new(AtomicUsize::new(0));
	let engine = KeyedEngine {
		key: "K1",
		steps: Arc::clone(&steps),
	};
	let cached = vec![stat("SALET", 3.42, 5, 4), stat("REAST", 3.44, 5, 4)];
	let cache: MemoryCacheStore = [("K1", cached.clone())].into_iter().collect();
	let Launched { session, worker } = launch_with_cache(engine, &Config::default(), Arc::new(cache)).unwrap();
	let selections = record_selections(&session);

	session.prepare(dictionary()).await.unwrap();

	let snapshot = session.snapshot();
	assert_eq!(snapshot.status, ThinkingStatus::Done);
	assert_eq!(snapshot.leader, Some(cached[0].clone()));
	assert_eq!(snapshot.best, cached);
	assert_eq!(snapshot.thinking_word, None);
	assert_eq!(*selections.lock(), vec![cached[0].clone()]);

	worker.shutdown().unwrap();
	assert_eq!(steps.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn guesses_and_undo_move_between_positions() {
	let script = vec![stat("CRANE", 3.5, 5, 1), stat("SLATE", 3.4, 5, 1)];
	let engine = ScriptedEngine::new(script);
	let journal = engine.journal();
	let after_crane = vec![stat("TOILS", 2.1, 3, 2)];
	let cache: MemoryCacheStore = [("CRANE-XX?!X", after_crane.clone())].into_iter().collect();
	let Launched { session, worker } = launch_with_cache(engine, &Config::default(), Arc::new(cache)).unwrap();

	session.prepare(dictionary()).await.unwrap();
	wait_for(&session, ThinkingStatus::Done).await;
	assert_eq!(session.snapshot().leader.map(|w| w.guess), Some("SLATE".to_owned()));

	session.select("CRANE", pattern("XX?!X")).await.unwrap();
	assert_eq!(session.status(), ThinkingStatus::Done);
	assert_eq!(session.snapshot().best, after_crane);

	assert_eq!(session.back().await.unwrap(), BackOutcome::Rewound);
	wait_for(&session, ThinkingStatus::Done).await;
	assert_eq!(session.snapshot().leader.map(|w| w.guess), Some("SLATE".to_owned()));

	assert_eq!(session.back().await.unwrap(), BackOutcome::AtStart);
	worker.shutdown().unwrap();
	assert_eq!(journal.count("back"), 2);
	assert_eq!(journal.count("make-guess CRANE XX?!X"), 1);
}

#[tokio::test]
async fn a_failed_step_can_still_be_stopped() {
	let _ = tracing_subscriber::fmt::try_init();
	let script = vec![stat("CRANE", 3.5, 5, 1), stat("SLATE", 3.4, 5, 1)];
	let Launched { session, worker } = launch(ScriptedEngine::new(script).failing_at(1), &Config::default()).unwrap();

	session.prepare(dictionary()).await.unwrap();
	wait_for(&session, ThinkingStatus::Thinking).await;

	session.stop().await.unwrap();
	wait_for(&session, ThinkingStatus::Done).await;
	assert_eq!(session.snapshot().best, vec![stat("CRANE", 3.5, 5, 1)]);

	worker.shutdown().unwrap();
}

#[tokio::test]
async fn engine_rejections_reach_the_session() {
	let Launched { session, worker } = launch(ScriptedEngine::new(vec![stat("CRANE", 3.5, 5, 1)]), &Config::default()).unwrap();

	assert_eq!(
		session.prepare(Dictionary::default()).await,
		Err(Error::Engine("dictionary has no allowed guesses".into()))
	);
	assert_eq!(session.status(), ThinkingStatus::Initializing);

	session.prepare(dictionary()).await.unwrap();
	wait_for(&session, ThinkingStatus::Done).await;
	assert_eq!(
		session.select("ZZZZZ", pattern("XXXXX")).await,
		Err(Error::Engine("ZZZZZ is not an allowed guess".into()))
	);
	assert_eq!(session.snapshot().best, vec![stat("CRANE", 3.5, 5, 1)]);

	worker.shutdown().unwrap();
}

#[tokio::test]
async fn cache_directory_from_config_serves_the_opening() {
	let dir = tempfile::tempdir().unwrap();
	std::fs::write(
		dir.path().join("root.json"),
		r#"[{"guess":"SALET","avg_guesses":3.42,"worst_num_guesses":5,"max_depth":4}]"#,
	)
	.unwrap();
	let mut config = Config::default();
	config.cache.dir = Some(dir.path().to_path_buf());
	let engine = ScriptedEngine::new(vec![stat("CRANE", 3.5, 5, 1)]);
	let journal = engine.journal();
	let Launched { session, worker } = launch(engine, &config).unwrap();

	session.prepare(dictionary()).await.unwrap();

	let snapshot = session.snapshot();
	assert_eq!(snapshot.status, ThinkingStatus::Done);
	assert_eq!(snapshot.best, vec![stat("SALET", 3.42, 5, 4)]);
	worker.shutdown().unwrap();
	assert_eq!(journal.count("step"), 0);
}

#[tokio::test]
async fn best_list_limit_comes_from_config() {
	let script: Vec<_> = ["CRANE", "SLATE", "TRACE", "SALET"]
		.iter()
		.enumerate()
		.map(|(i, w)| stat(w, 3.0 + i as f64 / 10.0, 5, 1))
		.collect();
	let config = Config::from_toml_str("[thinking]\nbest_list_limit = 2\n").unwrap();
	let Launched { session, worker } = launch(ScriptedEngine::new(script), &config).unwrap();

	session.prepare(dictionary()).await.unwrap();
	wait_for(&session, ThinkingStatus::Done).await;
	let best: Vec<_> = session.snapshot().best.into_iter().map(|w| w.guess).collect();
	assert_eq!(best, vec!["CRANE", "SLATE"]);

	worker.shutdown().unwrap();
}

#[tokio::test]
async fn invalid_config_is_rejected() {
	assert!(Config::from_toml_str("[pipe]\nwindow = 0\n").is_err());
	let mut config = Config::default();
	config.pipe.window = 0;
	assert!(matches!(
		launch(ScriptedEngine::new(Vec::new()), &config),
		Err(LaunchError::Config(_))
	));
}
