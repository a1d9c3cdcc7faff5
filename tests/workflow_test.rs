//! End-to-end exercises of the question lifecycle through the service
//! layer: claims, submission, review, resubmission, finalization, and
//! the wallet side effects of approval.

mod common;

use common::{seed_course, seed_paper, seed_user, state, valid_input};
use question_workflow::models::Role;
use question_workflow::workflow::SubmitMode;
use question_workflow::QuestionStatus;
use uuid::Uuid;

#[tokio::test]
async fn claim_is_exclusive_and_idempotent() {
    let state = state();
    let admin = seed_user(&state, "Admin", "admin@portal.in", Role::Admin).await;
    let maker_a = seed_user(&state, "Asha", "asha@portal.in", Role::Maker).await;
    let maker_b = seed_user(&state, "Bala", "bala@portal.in", Role::Maker).await;
    let course = seed_course(&state, &admin).await;
    let paper = seed_paper(&state, &course, 10).await;

    let claimed = state.claims.claim(paper.id, &maker_a).await.unwrap();
    assert_eq!(claimed.used_by, Some(maker_a.id));

    // re-claiming your own paper is a no-op
    let again = state.claims.claim(paper.id, &maker_a).await.unwrap();
    assert_eq!(again.used_by, Some(maker_a.id));

    let err = state.claims.claim(paper.id, &maker_b).await.unwrap_err();
    assert_eq!(err.kind(), "already_claimed");

    // the claimed paper disappears from the available list
    assert!(state.claims.list_available().await.is_empty());
    assert_eq!(state.claims.list_claimed_by(maker_a.id).await.len(), 1);
}

#[tokio::test]
async fn concurrent_claims_have_exactly_one_winner() {
    let state = state();
    let admin = seed_user(&state, "Admin", "admin@portal.in", Role::Admin).await;
    let course = seed_course(&state, &admin).await;
    let paper = seed_paper(&state, &course, 10).await;

    let mut makers = Vec::new();
    for i in 0..8 {
        makers.push(
            seed_user(
                &state,
                &format!("Maker {i}"),
                &format!("maker{i}@portal.in"),
                Role::Maker,
            )
            .await,
        );
    }

    let paper_id = paper.id;
    let mut handles = Vec::new();
    for maker in makers {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            state.claims.claim(paper_id, &maker).await
        }));
    }

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(e) => assert_eq!(e.kind(), "already_claimed"),
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn submission_gate_rejects_missing_correct_option() {
    let state = state();
    let admin = seed_user(&state, "Admin", "admin@portal.in", Role::Admin).await;
    let maker = seed_user(&state, "Asha", "asha@portal.in", Role::Maker).await;
    let course = seed_course(&state, &admin).await;
    let paper = seed_paper(&state, &course, 10).await;
    state.claims.claim(paper.id, &maker).await.unwrap();

    let mut input = valid_input(&paper, &course);
    for option in &mut input.options {
        option.is_correct = false;
    }

    let err = state
        .flow
        .create(&maker, input.clone(), SubmitMode::Pending)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "validation");
    assert!(err.to_string().contains("exactly one correct answer"));

    // the same content is fine as a draft
    let draft = state.flow.create(&maker, input, SubmitMode::Draft).await.unwrap();
    assert_eq!(draft.status, QuestionStatus::Draft);
}

#[tokio::test]
async fn create_requires_the_makers_own_claim() {
    let state = state();
    let admin = seed_user(&state, "Admin", "admin@portal.in", Role::Admin).await;
    let maker_a = seed_user(&state, "Asha", "asha@portal.in", Role::Maker).await;
    let maker_b = seed_user(&state, "Bala", "bala@portal.in", Role::Maker).await;
    let course = seed_course(&state, &admin).await;
    let paper = seed_paper(&state, &course, 10).await;
    state.claims.claim(paper.id, &maker_a).await.unwrap();

    let err = state
        .flow
        .create(&maker_b, valid_input(&paper, &course), SubmitMode::Pending)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "forbidden");
}

#[tokio::test]
async fn draft_edits_are_last_write_wins() {
    let state = state();
    let admin = seed_user(&state, "Admin", "admin@portal.in", Role::Admin).await;
    let maker = seed_user(&state, "Asha", "asha@portal.in", Role::Maker).await;
    let course = seed_course(&state, &admin).await;
    let paper = seed_paper(&state, &course, 10).await;
    state.claims.claim(paper.id, &maker).await.unwrap();

    let draft = state
        .flow
        .create(&maker, valid_input(&paper, &course), SubmitMode::Draft)
        .await
        .unwrap();

    let mut edit = valid_input(&paper, &course);
    edit.topic = "Total internal reflection".to_string();
    edit.keywords = vec!["critical angle".to_string()];
    let saved = state
        .flow
        .update_draft(&maker, draft.id, edit, SubmitMode::Draft)
        .await
        .unwrap();
    assert_eq!(saved.topic, "Total internal reflection");
    assert_eq!(saved.keywords, vec!["critical angle".to_string()]);
    assert_eq!(saved.status, QuestionStatus::Draft);

    // promotion re-runs the gate and moves to Pending
    let submitted = state
        .flow
        .update_draft(&maker, draft.id, valid_input(&paper, &course), SubmitMode::Pending)
        .await
        .unwrap();
    assert_eq!(submitted.status, QuestionStatus::Pending);

    // a Pending question can no longer be edited through the draft path
    let err = state
        .flow
        .update_draft(&maker, draft.id, valid_input(&paper, &course), SubmitMode::Draft)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_transition");
}

#[tokio::test]
async fn rejection_requires_comments_and_records_them() {
    let state = state();
    let admin = seed_user(&state, "Admin", "admin@portal.in", Role::Admin).await;
    let maker = seed_user(&state, "Asha", "asha@portal.in", Role::Maker).await;
    let checker = seed_user(&state, "Chitra", "chitra@portal.in", Role::Checker).await;
    let course = seed_course(&state, &admin).await;
    let paper = seed_paper(&state, &course, 10).await;
    state.claims.claim(paper.id, &maker).await.unwrap();

    let question = state
        .flow
        .create(&maker, valid_input(&paper, &course), SubmitMode::Pending)
        .await
        .unwrap();

    let err = state.flow.reject(&checker, question.id, "  ").await.unwrap_err();
    assert_eq!(err.kind(), "validation");

    let rejected = state
        .flow
        .reject(&checker, question.id, "Option B wording is ambiguous")
        .await
        .unwrap();
    assert_eq!(rejected.status, QuestionStatus::Rejected);
    assert_eq!(
        rejected.checker_comments.as_deref(),
        Some("Option B wording is ambiguous")
    );
}

#[tokio::test]
async fn resubmission_needs_a_canned_response_and_reenters_review() {
    let state = state();
    let admin = seed_user(&state, "Admin", "admin@portal.in", Role::Admin).await;
    let maker = seed_user(&state, "Asha", "asha@portal.in", Role::Maker).await;
    let checker = seed_user(&state, "Chitra", "chitra@portal.in", Role::Checker).await;
    let course = seed_course(&state, &admin).await;
    let paper = seed_paper(&state, &course, 10).await;
    state.claims.claim(paper.id, &maker).await.unwrap();

    let question = state
        .flow
        .create(&maker, valid_input(&paper, &course), SubmitMode::Pending)
        .await
        .unwrap();
    state.flow.reject(&checker, question.id, "fix option 2").await.unwrap();

    let err = state
        .flow
        .resubmit(&maker, question.id, valid_input(&paper, &course), "fixed it, promise")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "validation");

    let resubmitted = state
        .flow
        .resubmit(&maker, question.id, valid_input(&paper, &course), "Corrections done")
        .await
        .unwrap();
    assert_eq!(resubmitted.status, QuestionStatus::Pending);
    assert_eq!(resubmitted.maker_comments.as_deref(), Some("Corrections done"));

    // approval then credits the maker and bumps the paper counter
    state.flow.approve(&checker, question.id).await.unwrap();
    let db = state.store.read().await;
    assert_eq!(db.paper(paper.id).unwrap().approved_question_count, 1);
    assert_eq!(db.user(maker.id).unwrap().balance, 10);
}

#[tokio::test]
async fn bulk_approve_reports_per_item_outcomes() {
    let state = state();
    let admin = seed_user(&state, "Admin", "admin@portal.in", Role::Admin).await;
    let maker = seed_user(&state, "Asha", "asha@portal.in", Role::Maker).await;
    let checker = seed_user(&state, "Chitra", "chitra@portal.in", Role::Checker).await;
    let course = seed_course(&state, &admin).await;
    let paper = seed_paper(&state, &course, 10).await;
    state.claims.claim(paper.id, &maker).await.unwrap();

    let pending = state
        .flow
        .create(&maker, valid_input(&paper, &course), SubmitMode::Pending)
        .await
        .unwrap();
    let already_approved = state
        .flow
        .create(&maker, valid_input(&paper, &course), SubmitMode::Pending)
        .await
        .unwrap();
    state.flow.approve(&checker, already_approved.id).await.unwrap();

    let missing = Uuid::new_v4();
    let report = state
        .flow
        .approve_bulk(&checker, &[pending.id, already_approved.id, missing])
        .await;

    assert_eq!(report.succeeded, vec![pending.id]);
    assert_eq!(report.failed.len(), 2);
    let kind_of = |id: Uuid| {
        report
            .failed
            .iter()
            .find(|f| f.id == id)
            .map(|f| f.kind)
            .unwrap()
    };
    assert_eq!(kind_of(already_approved.id), "invalid_transition");
    assert_eq!(kind_of(missing), "not_found");

    // the failed items did not disturb state
    let db = state.store.read().await;
    assert_eq!(db.paper(paper.id).unwrap().approved_question_count, 2);
    assert_eq!(
        db.question(already_approved.id).unwrap().status,
        QuestionStatus::Approved
    );
}

#[tokio::test]
async fn invalid_transitions_leave_the_question_untouched() {
    let state = state();
    let admin = seed_user(&state, "Admin", "admin@portal.in", Role::Admin).await;
    let maker = seed_user(&state, "Asha", "asha@portal.in", Role::Maker).await;
    let checker = seed_user(&state, "Chitra", "chitra@portal.in", Role::Checker).await;
    let expert = seed_user(&state, "Esha", "esha@portal.in", Role::Expert).await;
    let course = seed_course(&state, &admin).await;
    let paper = seed_paper(&state, &course, 10).await;
    state.claims.claim(paper.id, &maker).await.unwrap();

    let question = state
        .flow
        .create(&maker, valid_input(&paper, &course), SubmitMode::Pending)
        .await
        .unwrap();

    // finalizing a Pending question is out of order
    let err = state
        .flow
        .finalize(&expert, question.id, Default::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_transition");

    state.flow.approve(&checker, question.id).await.unwrap();

    // double approval
    let err = state.flow.approve(&checker, question.id).await.unwrap_err();
    assert_eq!(err.kind(), "invalid_transition");

    // rejecting after approval
    let err = state
        .flow
        .reject(&checker, question.id, "too late")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_transition");

    let db = state.store.read().await;
    assert_eq!(db.question(question.id).unwrap().status, QuestionStatus::Approved);
    assert_eq!(db.paper(paper.id).unwrap().approved_question_count, 1);
}

#[tokio::test]
async fn exhausting_a_paper_releases_the_claim_and_blocks_new_questions() {
    let state = state();
    let admin = seed_user(&state, "Admin", "admin@portal.in", Role::Admin).await;
    let maker = seed_user(&state, "Asha", "asha@portal.in", Role::Maker).await;
    let checker = seed_user(&state, "Chitra", "chitra@portal.in", Role::Checker).await;
    let course = seed_course(&state, &admin).await;
    let paper = seed_paper(&state, &course, 1).await;
    state.claims.claim(paper.id, &maker).await.unwrap();

    let question = state
        .flow
        .create(&maker, valid_input(&paper, &course), SubmitMode::Pending)
        .await
        .unwrap();
    state.flow.approve(&checker, question.id).await.unwrap();

    {
        let db = state.store.read().await;
        let paper = db.paper(paper.id).unwrap();
        assert_eq!(paper.approved_question_count, 1);
        assert_eq!(paper.used_by, None, "exhausted paper releases its claim");
    }

    // the paper can be re-claimed, but no new question may be created
    state.claims.claim(paper.id, &maker).await.unwrap();
    let err = state
        .flow
        .create(&maker, valid_input(&paper, &course), SubmitMode::Draft)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "conflict");

    // nor does it show up as available once released again
    state.claims.release(paper.id).await.unwrap();
    assert!(state.claims.list_available().await.is_empty());
}

#[tokio::test]
async fn finalization_applies_expert_metadata_and_is_terminal() {
    let state = state();
    let admin = seed_user(&state, "Admin", "admin@portal.in", Role::Admin).await;
    let maker = seed_user(&state, "Asha", "asha@portal.in", Role::Maker).await;
    let checker = seed_user(&state, "Chitra", "chitra@portal.in", Role::Checker).await;
    let expert = seed_user(&state, "Esha", "esha@portal.in", Role::Expert).await;
    let course = seed_course(&state, &admin).await;
    let paper = seed_paper(&state, &course, 10).await;
    state.claims.claim(paper.id, &maker).await.unwrap();

    let mut input = valid_input(&paper, &course);
    input.unit_no = None;
    let question = state
        .flow
        .create(&maker, input, SubmitMode::Pending)
        .await
        .unwrap();
    state.flow.approve(&checker, question.id).await.unwrap();

    // the finalization gate wants the missing unit number
    let err = state
        .flow
        .finalize(&expert, question.id, Default::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "validation");

    let input: question_workflow::workflow::FinalizeInput =
        serde_json::from_value(serde_json::json!({ "unit_no": 4, "topic": "Snell's law" }))
            .unwrap();
    let finalised = state.flow.finalize(&expert, question.id, input).await.unwrap();
    assert_eq!(finalised.status, QuestionStatus::Finalised);
    assert_eq!(finalised.unit_no, Some(4));
    assert_eq!(finalised.topic, "Snell's law");

    let err = state
        .flow
        .finalize(&expert, question.id, Default::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_transition");
}

#[tokio::test]
async fn draft_bulk_delete_spares_submitted_questions() {
    let state = state();
    let admin = seed_user(&state, "Admin", "admin@portal.in", Role::Admin).await;
    let maker = seed_user(&state, "Asha", "asha@portal.in", Role::Maker).await;
    let other = seed_user(&state, "Bala", "bala@portal.in", Role::Maker).await;
    let course = seed_course(&state, &admin).await;
    let paper = seed_paper(&state, &course, 10).await;
    let paper_b = seed_paper(&state, &course, 10).await;
    state.claims.claim(paper.id, &maker).await.unwrap();
    state.claims.claim(paper_b.id, &other).await.unwrap();

    let draft = state
        .flow
        .create(&maker, valid_input(&paper, &course), SubmitMode::Draft)
        .await
        .unwrap();
    let submitted = state
        .flow
        .create(&maker, valid_input(&paper, &course), SubmitMode::Pending)
        .await
        .unwrap();
    let foreign = state
        .flow
        .create(&other, valid_input(&paper_b, &course), SubmitMode::Draft)
        .await
        .unwrap();

    let report = state
        .flow
        .delete_drafts(&maker, &[draft.id, submitted.id, foreign.id])
        .await;
    assert_eq!(report.succeeded, vec![draft.id]);
    assert_eq!(report.failed.len(), 2);

    let db = state.store.read().await;
    assert!(db.question(draft.id).is_err());
    assert!(db.question(submitted.id).is_ok());
    assert!(db.question(foreign.id).is_ok());
}

#[tokio::test]
async fn earnings_accrue_and_payouts_are_idempotent() {
    let state = state();
    let admin = seed_user(&state, "Admin", "admin@portal.in", Role::Admin).await;
    let maker = seed_user(&state, "Asha", "asha@portal.in", Role::Maker).await;
    let checker = seed_user(&state, "Chitra", "chitra@portal.in", Role::Checker).await;
    let course = seed_course(&state, &admin).await;
    let paper = seed_paper(&state, &course, 10).await;
    state.claims.claim(paper.id, &maker).await.unwrap();

    for _ in 0..2 {
        let question = state
            .flow
            .create(&maker, valid_input(&paper, &course), SubmitMode::Pending)
            .await
            .unwrap();
        state.flow.approve(&checker, question.id).await.unwrap();
    }
    let report = state.wallet.balance(maker.id).await.unwrap();
    assert_eq!(report.balance, 20);
    assert_eq!(report.total_earned, 20);

    let request_id = Uuid::new_v4();
    let payout = state
        .wallet
        .payout(maker.id, 15, "July payout".to_string(), request_id)
        .await
        .unwrap();
    let retry = state
        .wallet
        .payout(maker.id, 15, "July payout".to_string(), request_id)
        .await
        .unwrap();
    assert_eq!(payout.id, retry.id);
    assert_eq!(state.wallet.balance(maker.id).await.unwrap().balance, 5);

    // overdraw with a fresh request id
    let err = state
        .wallet
        .payout(maker.id, 50, "too much".to_string(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "validation");
    assert_eq!(state.wallet.balance(maker.id).await.unwrap().balance, 5);
}

#[tokio::test]
async fn unchanged_resubmission_shows_up_as_a_false_rejection() {
    let state = state();
    let admin = seed_user(&state, "Admin", "admin@portal.in", Role::Admin).await;
    let maker = seed_user(&state, "Asha", "asha@portal.in", Role::Maker).await;
    let checker = seed_user(&state, "Chitra", "chitra@portal.in", Role::Checker).await;
    let course = seed_course(&state, &admin).await;
    let paper = seed_paper(&state, &course, 10).await;
    state.claims.claim(paper.id, &maker).await.unwrap();

    let question = state
        .flow
        .create(&maker, valid_input(&paper, &course), SubmitMode::Pending)
        .await
        .unwrap();
    state.flow.reject(&checker, question.id, "does not look right").await.unwrap();
    // the maker resubmits the identical content and the checker caves
    state
        .flow
        .resubmit(&maker, question.id, valid_input(&paper, &course), "No changes required")
        .await
        .unwrap();
    state.flow.approve(&checker, question.id).await.unwrap();

    let window = Default::default();
    let checker_stats = state.reports.checker_stats(checker.id, window).await.unwrap();
    assert_eq!(checker_stats.rejected, 1);
    assert_eq!(checker_stats.approved, 1);
    assert_eq!(checker_stats.false_rejections, 1);

    let maker_stats = state.reports.maker_stats(maker.id, window).await.unwrap();
    assert_eq!(maker_stats.false_rejections, 1);
    assert_eq!(maker_stats.historical_rejections, 1);
}

#[tokio::test]
async fn fixed_resubmission_is_a_historical_but_not_false_rejection() {
    let state = state();
    let admin = seed_user(&state, "Admin", "admin@portal.in", Role::Admin).await;
    let maker = seed_user(&state, "Asha", "asha@portal.in", Role::Maker).await;
    let checker = seed_user(&state, "Chitra", "chitra@portal.in", Role::Checker).await;
    let course = seed_course(&state, &admin).await;
    let paper = seed_paper(&state, &course, 10).await;
    state.claims.claim(paper.id, &maker).await.unwrap();

    let question = state
        .flow
        .create(&maker, valid_input(&paper, &course), SubmitMode::Pending)
        .await
        .unwrap();
    state.flow.reject(&checker, question.id, "explanation is wrong").await.unwrap();

    let mut fixed = valid_input(&paper, &course);
    fixed.explanation.text = "Light speeds up, so the ray bends away from the normal.".to_string();
    state
        .flow
        .resubmit(&maker, question.id, fixed, "Rewrote the explanation")
        .await
        .unwrap();
    state.flow.approve(&checker, question.id).await.unwrap();

    let stats = state
        .reports
        .checker_stats(checker.id, Default::default())
        .await
        .unwrap();
    assert_eq!(stats.false_rejections, 0);

    let maker_stats = state
        .reports
        .maker_stats(maker.id, Default::default())
        .await
        .unwrap();
    assert_eq!(maker_stats.historical_rejections, 1);
}
