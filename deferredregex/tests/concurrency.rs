use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;
use std::thread;
use std::time::Duration;

use regex::Regex;

use deferredregex::{Compile, DeferredRegex};

const THREADS: usize = 16;

/// Each engine gets its own counter, since the tests in this file
/// run in parallel.
macro_rules! counting_engine {
    ($name:ident, $counter:ident) => {
        static $counter: AtomicUsize = AtomicUsize::new(0);

        struct $name(Regex);

        impl Compile for $name {
            type Error = regex::Error;

            fn compile(pattern: &str) -> Result<Self, regex::Error> {
                $counter.fetch_add(1, Ordering::SeqCst);
                // Make the window in which other threads can arrive
                // during compilation nice and wide.
                thread::sleep(Duration::from_millis(20));
                Regex::new(pattern).map($name)
            }
        }

        impl Deref for $name {
            type Target = Regex;

            fn deref(&self) -> &Regex {
                &self.0
            }
        }
    };
}

counting_engine!(SemverEngine, SEMVER_COMPILATIONS);
counting_engine!(BrokenEngine, BROKEN_COMPILATIONS);
counting_engine!(IdleEngine, IDLE_COMPILATIONS);

#[test]
fn concurrent_first_use_compiles_exactly_once() {
    let dr: DeferredRegex<SemverEngine> = DeferredRegex::new(r"([0-9]+)\.([0-9]+)\.([0-9]+)");
    let barrier = Barrier::new(THREADS);

    let results: Vec<Vec<String>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let dr = &dr;
                let barrier = &barrier;
                scope.spawn(move || {
                    let haystack = format!("{i}.{}.{}", i + 1, i + 2);
                    barrier.wait();
                    let caps = dr.captures(&haystack).expect("should match");
                    caps.iter()
                        .map(|m| m.map_or(String::new(), |m| m.as_str().to_string()))
                        .collect::<Vec<String>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .collect()
    });

    assert_eq!(SEMVER_COMPILATIONS.load(Ordering::SeqCst), 1);
    for (i, groups) in results.iter().enumerate() {
        let expected = vec![
            format!("{i}.{}.{}", i + 1, i + 2),
            i.to_string(),
            (i + 1).to_string(),
            (i + 2).to_string(),
        ];
        assert_eq!(groups, &expected);
    }
}

#[test]
fn concurrent_first_use_of_invalid_pattern_compiles_once() {
    let dr: DeferredRegex<BrokenEngine> = DeferredRegex::new("(");
    let barrier = Barrier::new(THREADS);

    let failures = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let dr = &dr;
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    dr.try_compiled().is_err()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .filter(|failed| *failed)
            .count()
    });

    assert_eq!(failures, THREADS);
    assert_eq!(BROKEN_COMPILATIONS.load(Ordering::SeqCst), 1);
}

#[test]
fn rendering_and_loading_never_compile() {
    let mut dr: DeferredRegex<IdleEngine> = DeferredRegex::new("a+");
    thread::scope(|scope| {
        for _ in 0..THREADS {
            let dr = &dr;
            scope.spawn(move || {
                assert_eq!(dr.pattern(), "a+");
                assert_eq!(dr.to_string(), "a+");
            });
        }
    });
    dr.set_pattern("b+");
    let parsed: DeferredRegex<IdleEngine> = "c+".parse().expect("parsing never fails");
    assert_eq!(parsed.pattern(), "c+");
    assert_eq!(dr.pattern(), "b+");
    assert_eq!(IDLE_COMPILATIONS.load(Ordering::SeqCst), 0);

    assert!(dr.is_match("bbb"));
    assert_eq!(IDLE_COMPILATIONS.load(Ordering::SeqCst), 1);
}
