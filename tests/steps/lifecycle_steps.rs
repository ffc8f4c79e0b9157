//! Steps for formatter lifecycle behavioural tests.
use cucumber::{given, then, when};
use gherkin_relay::{FormatterError, ShutdownReport};
use gherkin_relay_testing::Behaviour;

use crate::world::LifecycleWorld;

#[given(expr = "the environment variable {string} is {string}")]
fn given_var(world: &mut LifecycleWorld, name: String, value: String) { world.set_var(&name, &value); }

#[given(expr = "formatter {string} is registered")]
fn given_formatter(world: &mut LifecycleWorld, name: String) { world.register(&name, Behaviour::Record); }

#[given(expr = "formatter {string} is registered and fails on envelope {int}")]
fn given_failing_formatter(world: &mut LifecycleWorld, name: String, n: usize) {
    world.register(&name, Behaviour::FailOn(n));
}

#[when(expr = "a run with {int} steps is published")]
async fn when_run(world: &mut LifecycleWorld, steps: usize) { world.publish_run(steps).await; }

#[when("one more envelope is published")]
async fn when_extra(world: &mut LifecycleWorld) { world.publish_extra().await; }

#[then(expr = "formatter {string} received {int} envelopes")]
async fn then_received(world: &mut LifecycleWorld, name: String, count: usize) {
    assert_eq!(world.received(&name).await, count);
}

#[then(expr = "formatter {string} never started")]
async fn then_never_started(world: &mut LifecycleWorld, name: String) {
    assert!(matches!(world.report(&name).await.result, Ok(ShutdownReport::NeverStarted)));
}

#[then(expr = "formatter {string} completed")]
async fn then_completed(world: &mut LifecycleWorld, name: String) {
    assert!(matches!(world.report(&name).await.result, Ok(ShutdownReport::Completed)));
}

#[then(expr = "formatter {string} reported an error")]
async fn then_failed(world: &mut LifecycleWorld, name: String) {
    assert!(matches!(world.report(&name).await.result, Err(FormatterError::Processing(_))));
}
