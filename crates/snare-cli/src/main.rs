use std::cell::Cell;
use std::panic;
use std::rc::Rc;

use serde::Serialize;
use serde_json::{Value, json};
use snare::impls::MethodTable;
use snare::ports::{DoesNotUnderstand, send};
use snare::{Outcome, OutcomeSummary, attempt, bind, catch, finally};

/// One line of the report: scenario name + what came back.
#[derive(Debug, Serialize)]
struct Report {
    scenario: &'static str,
    #[serde(flatten)]
    outcome: OutcomeSummary,
}

fn help(_x: i32) -> String {
    panic!("help!")
}

fn report<T: std::fmt::Debug>(scenario: &'static str, outcome: &Outcome<T>) {
    let summary = outcome.summary();
    println!("{scenario}: {summary}");
    let line = Report {
        scenario,
        outcome: summary,
    };
    match serde_json::to_string(&line) {
        Ok(json) => println!("  {json}"),
        Err(e) => log::warn!("report encode failed: {e}"),
    }
}

fn main() {
    env_logger::init();

    // 捕捉済みの panic は stderr に出さず、ログに回す
    panic::set_hook(Box::new(|info| {
        log::debug!("panic intercepted: {info}");
    }));

    // (A) handler なし: panic はそのままエラーになる
    report("uncaught", &attempt(bind(help, (10,)), []));

    // (B) String handler が値を返す
    report(
        "catch",
        &attempt(bind(help, (10,)), [catch(|s: String| Some(s))]),
    );

    // (C) finalizer の値は残るが、エラーは隠さない
    report(
        "finally",
        &attempt(bind(help, (10,)), [finally(|| Some("Finally".to_string()))]),
    );

    // (D) catch + finally: finalizer は 1 回だけ走る
    let runs = Rc::new(Cell::new(0));
    let counter = runs.clone();
    let outcome = attempt(
        bind(help, (10,)),
        [
            catch(|s: String| Some(s)),
            finally(move || {
                counter.set(counter.get() + 1);
                println!("Finally");
            }),
        ],
    );
    report("catch+finally", &outcome);
    log::info!("finalizer ran {} time(s)", runs.get());

    // (E) 値を返さない handler と、値を返す finalizer
    report(
        "catch+finally (no result)",
        &attempt(
            bind(help, (10,)),
            [catch(|_: String| {}), finally(|| Some("Finally".to_string()))],
        ),
    );

    // (F) 成功時: finalizer は現在の値を見て、そのまま返す
    report(
        "no error",
        &attempt(
            bind(|x: i32| x, (10,)),
            [
                catch(|_: String| None::<i32>),
                finally(|cur: Option<&i32>| cur.copied()),
            ],
        ),
    );

    // (G) 名前によるメッセージ送信: 型付きエラーを handler で拾う
    let rcvr = Rc::new(MethodTable::new("rcvr!").method("String", |_| json!("rcvr!")));
    let fallback = rcvr.clone();
    let target = rcvr.clone();
    let outcome = attempt(
        move || send(target.as_ref(), "Foo", vec![]),
        [catch(move |e: DoesNotUnderstand| -> Option<Value> {
            println!("{e}");
            Some(send(fallback.as_ref(), "String", vec![]))
        })],
    );
    report("send (caught)", &outcome);

    // (H) handler がなければ元のエラー型のまま返る
    let outcome = attempt(move || send(rcvr.as_ref(), "Foo", vec![]), []);
    let preserved = outcome
        .error()
        .is_some_and(|err| err.is::<DoesNotUnderstand>());
    report("send (uncaught)", &outcome);
    println!("  error is DoesNotUnderstand: {preserved}");
}
