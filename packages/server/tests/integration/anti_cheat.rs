use common::flag::SIMILAR_CODE;
use contest_server::judge::SubmitRequest;

use crate::support::{ScriptedExecutor, TestContest, contestant};

const SOLUTION: &str = r#"
#include <bits/stdc++.h>
using namespace std;
int main() {
    long long a, b;
    cin >> a >> b;
    cout << a + b << endl;
    return 0;
}
"#;

const RENAMED: &str = r#"
#include <bits/stdc++.h>
using namespace std;
int main(){ long long x, b; cin >> x >> b; cout << x + b << endl; return 0; }
"#;

const UNRELATED: &str = r#"
import sys
print(sum(int(t) for t in sys.stdin.read().split()))
"#;

fn cpp(user: &str, code: &str) -> SubmitRequest {
    SubmitRequest {
        user_id: user.into(),
        problem_id: "p1".into(),
        round_id: "round1".into(),
        code: code.into(),
        language: "cpp".into(),
    }
}

async fn judged(contest: &TestContest, requests: Vec<SubmitRequest>) {
    for request in requests {
        let caller = contestant(&request.user_id);
        contest.state.judge.judge(&caller, request).await.unwrap();
        contest.clock.advance(1);
    }
}

#[tokio::test]
async fn scan_flags_copied_submissions() {
    let contest = TestContest::new(ScriptedExecutor::summing());
    contest.open_round("round1", 3600).await;
    judged(
        &contest,
        vec![
            cpp("alice", SOLUTION),
            cpp("bob", RENAMED),
            cpp("carol", UNRELATED),
        ],
    )
    .await;

    let report = contest.state.scanner.scan(None).await.unwrap();
    assert_eq!(report.checked, 3);
    assert_eq!(report.flags.len(), 1);

    let flag = &report.flags[0];
    assert_eq!(flag.kind, SIMILAR_CODE);
    assert_eq!(flag.problem_id, "p1");
    assert_eq!(flag.round_id, "round1");
    let mut users = [flag.user_a.as_str(), flag.user_b.as_str()];
    users.sort();
    assert_eq!(users, ["alice", "bob"]);

    let stored = contest.state.scanner.flags().await.unwrap();
    assert_eq!(stored, report.flags);
}

#[tokio::test]
async fn repeated_scans_append_flags() {
    let contest = TestContest::new(ScriptedExecutor::summing());
    contest.open_round("round1", 3600).await;
    judged(&contest, vec![cpp("alice", SOLUTION), cpp("bob", SOLUTION)]).await;

    contest.state.scanner.scan(None).await.unwrap();
    contest.clock.advance(60);
    contest.state.scanner.scan(None).await.unwrap();

    let flags = contest.state.scanner.flags().await.unwrap();
    assert_eq!(flags.len(), 2);
    assert!(flags[0].detected_at > flags[1].detected_at);
}

#[tokio::test]
async fn scan_limit_bounds_the_batch() {
    let contest = TestContest::new(ScriptedExecutor::summing());
    contest.open_round("round1", 3600).await;
    judged(
        &contest,
        vec![
            cpp("alice", SOLUTION),
            cpp("bob", SOLUTION),
            cpp("carol", UNRELATED),
        ],
    )
    .await;

    // Only carol's submission is in the newest-one batch.
    let report = contest.state.scanner.scan(Some(1)).await.unwrap();
    assert_eq!(report.checked, 1);
    assert!(report.flags.is_empty());
    assert!(contest.state.scanner.flags().await.unwrap().is_empty());
}

#[tokio::test]
async fn withheld_code_is_never_compared() {
    let contest = TestContest::with_config(
        r#"
        [rounds.round1]
        store_code = "fully_passed"
        "#,
        ScriptedExecutor::summing(),
    );
    contest.open_round("round1", 3600).await;
    // Both copies print the wrong answer, so their code is not kept.
    let wrong = format!("{SOLUTION}// off-by-one");
    judged(&contest, vec![cpp("alice", &wrong), cpp("bob", &wrong)]).await;

    let report = contest.state.scanner.scan(None).await.unwrap();
    assert_eq!(report.checked, 2);
    assert!(report.flags.is_empty());
}
