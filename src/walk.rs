//! Subtree walk.
//!
//! [`Walk`] enumerates every binding below a root OID with repeated GETNEXT
//! or GETBULK round trips. It runs in three phases:
//!
//! 1. an optional GET of the root itself (`include_start`),
//! 2. iteration from the cursor until a stop condition,
//! 3. an optional GET of the root if nothing at all was emitted
//!    (`fallback_on_empty`).
//!
//! Each returned binding is checked in reply order. An exception value, a
//! repeated OID, an OID outside the subtree or one at or past the end bound
//! stops the walk without being emitted. With `check_increase` on, an OID
//! that sorts before the cursor fails with [`Error::NonIncreasingOid`].

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;

use crate::error::{Error, Result};
use crate::oid::{Oid, is_subtree_member};
use crate::request::Request;
use crate::response::Response;
use crate::session::Session;
use crate::transport::Transport;
use crate::varbind::VarBind;

/// GETBULK parameters for a bulk walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkParams {
    pub non_repeaters: u32,
    pub max_repetitions: u32,
}

impl Default for BulkParams {
    fn default() -> Self {
        Self {
            non_repeaters: 0,
            max_repetitions: 10,
        }
    }
}

/// Walk policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOptions {
    /// GET the root first and emit it (default: false)
    pub include_start: bool,
    /// Fail on OIDs that sort before the cursor (default: true)
    pub check_increase: bool,
    /// GET the root if the walk found nothing (default: true)
    pub fallback_on_empty: bool,
    /// Stop before any OID at or past this one (default: none)
    pub end: Option<Oid>,
    /// Use GETBULK with these parameters instead of GETNEXT (default: none)
    pub bulk: Option<BulkParams>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            include_start: false,
            check_increase: true,
            fallback_on_empty: true,
            end: None,
            bulk: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Seed,
    Iterate,
    Fallback,
    Done,
}

/// Why a binding was not emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    Exception,
    Repeated,
    OutOfSubtree,
    EndReached,
}

enum Decision {
    Emit(VarBind),
    Stop(StopReason),
    Fail(Error),
}

type PendingResponse = Pin<Box<dyn Future<Output = Result<Response>> + Send>>;

/// Async stream over the bindings of one subtree.
///
/// Bindings emitted before an error stay emitted; after an error or a stop
/// condition the stream ends. [`Walk::matches`] reports how many bindings
/// were emitted.
pub struct Walk<T: Transport> {
    session: Session<T>,
    root: Oid,
    cursor: Oid,
    options: WalkOptions,
    phase: Phase,
    matches: usize,
    buffer: VecDeque<VarBind>,
    pending: Option<PendingResponse>,
}

impl<T: Transport + 'static> Walk<T> {
    pub fn new(session: Session<T>, root: Oid, options: WalkOptions) -> Self {
        let phase = if options.include_start {
            Phase::Seed
        } else {
            Phase::Iterate
        };
        Self {
            session,
            cursor: root.clone(),
            root,
            options,
            phase,
            matches: 0,
            buffer: VecDeque::new(),
            pending: None,
        }
    }

    /// Bindings emitted so far.
    pub fn matches(&self) -> usize {
        self.matches
    }

    pub fn root(&self) -> &Oid {
        &self.root
    }

    fn request(&self) -> Request {
        match self.phase {
            Phase::Iterate => match self.options.bulk {
                Some(bulk) => Request::get_bulk(
                    vec![self.cursor.clone()],
                    bulk.non_repeaters,
                    bulk.max_repetitions,
                ),
                None => Request::get_next(vec![self.cursor.clone()]),
            },
            _ => Request::get(vec![self.root.clone()]),
        }
    }

    fn start_request(&mut self) {
        let session = self.session.clone();
        let request = self.request();
        tracing::trace!(target: "snmpc::walk", { snmp.oid = %self.cursor, snmp.request = request.name() }, "walk request");
        self.pending = Some(Box::pin(async move { session.execute(&request).await }));
    }

    /// Leave the iteration phase.
    fn end_iteration(&mut self, reason: Option<StopReason>) {
        self.buffer.clear();
        tracing::debug!(target: "snmpc::walk", { snmp.oid = %self.root, snmp.matches = self.matches, reason = ?reason }, "walk iteration finished");
        self.phase = if self.matches == 0 && self.options.fallback_on_empty {
            Phase::Fallback
        } else {
            Phase::Done
        };
    }

    fn decide(&mut self, vb: VarBind) -> Decision {
        if vb.is_exception() {
            return Decision::Stop(StopReason::Exception);
        }
        if self.options.check_increase && vb.oid < self.cursor {
            return Decision::Fail(Error::NonIncreasingOid {
                previous: self.cursor.clone(),
                current: vb.oid,
            });
        }
        if vb.oid == self.cursor {
            return Decision::Stop(StopReason::Repeated);
        }
        if !is_subtree_member(&self.root, &vb.oid) {
            return Decision::Stop(StopReason::OutOfSubtree);
        }
        if let Some(end) = &self.options.end
            && vb.oid >= *end
        {
            return Decision::Stop(StopReason::EndReached);
        }
        self.cursor = vb.oid.clone();
        Decision::Emit(vb)
    }

    fn emit(&mut self, vb: VarBind) -> Poll<Option<Result<VarBind>>> {
        self.matches += 1;
        Poll::Ready(Some(Ok(vb)))
    }

    fn fail(&mut self, err: Error) -> Poll<Option<Result<VarBind>>> {
        tracing::debug!(target: "snmpc::walk", { snmp.oid = %self.cursor, snmp.matches = self.matches, error = %err }, "walk failed");
        self.phase = Phase::Done;
        self.buffer.clear();
        Poll::Ready(Some(Err(err)))
    }

    /// Handle the reply to the GET of the root (seed or fallback).
    ///
    /// The binding is emitted whatever it holds. Returns `Some` to yield.
    fn on_root_reply(&mut self, response: Response) -> Option<Poll<Option<Result<VarBind>>>> {
        self.phase = match self.phase {
            Phase::Seed => Phase::Iterate,
            _ => Phase::Done,
        };
        match response.check() {
            Ok(varbinds) => varbinds.into_iter().next().map(|vb| self.emit(vb)),
            Err(e) => Some(self.fail(e)),
        }
    }

    /// Handle one GETNEXT or GETBULK reply. Returns `Some` to yield.
    fn on_iterate_reply(&mut self, response: Response) -> Option<Poll<Option<Result<VarBind>>>> {
        if response.is_error() {
            // Report against the cursor, whatever index the agent gave
            let err = Error::Snmp {
                target: response.source,
                status: response.status,
                index: response.index,
                oid: Some(self.cursor.clone()),
            };
            return Some(self.fail(err));
        }
        if response.varbinds.is_empty() {
            self.end_iteration(None);
            return None;
        }
        tracing::trace!(target: "snmpc::walk", { snmp.varbind_count = response.varbinds.len() }, "walk batch");
        self.buffer.extend(response.varbinds);
        None
    }
}

impl<T: Transport + 'static> Stream for Walk<T> {
    type Item = Result<VarBind>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        loop {
            while let Some(vb) = this.buffer.pop_front() {
                match this.decide(vb) {
                    Decision::Emit(vb) => return this.emit(vb),
                    Decision::Stop(reason) => this.end_iteration(Some(reason)),
                    Decision::Fail(err) => return this.fail(err),
                }
            }

            if this.phase == Phase::Done {
                return Poll::Ready(None);
            }

            if this.pending.is_none() {
                this.start_request();
            }
            let Some(pending) = this.pending.as_mut() else {
                return Poll::Ready(None);
            };

            let result = match pending.as_mut().poll(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(result) => result,
            };
            this.pending = None;

            let response = match result {
                Ok(response) => response,
                Err(e) => return this.fail(e),
            };

            let ready = match this.phase {
                Phase::Seed | Phase::Fallback => this.on_root_reply(response),
                Phase::Iterate => this.on_iterate_reply(response),
                Phase::Done => return Poll::Ready(None),
            };
            if let Some(ready) = ready {
                return ready;
            }
        }
    }
}

impl<T: Transport + 'static> Session<T> {
    /// Walk the subtree under `root`.
    pub fn walk(&self, root: Oid, options: WalkOptions) -> Walk<T> {
        Walk::new(self.clone(), root, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::oid;
    use crate::pdu::PduType;
    use crate::session::SessionConfig;
    use crate::transport::{MockTransport, ResponseBuilder};
    use crate::value::Value;
    use std::time::Duration;

    fn mock() -> MockTransport {
        MockTransport::new("127.0.0.1:161".parse().unwrap())
    }

    fn session(mock: &MockTransport) -> Session<MockTransport> {
        Session::new(
            mock.clone(),
            SessionConfig {
                timeout: Duration::from_millis(50),
                retries: 0,
                ..SessionConfig::default()
            },
        )
    }

    fn reply(mock: &MockTransport, bindings: &[(Oid, Value)]) {
        let mut builder = ResponseBuilder::new(0);
        for (oid, value) in bindings {
            builder = builder.varbind(oid.clone(), value.clone());
        }
        mock.queue_response(builder.build_v2c(b"public"));
    }

    fn system() -> Oid {
        oid!(1, 3, 6, 1, 2, 1, 1)
    }

    async fn collect<T: Transport + 'static>(walk: &mut Walk<T>) -> Vec<Result<VarBind>> {
        use std::future::poll_fn;

        let mut walk = Pin::new(walk);
        let mut results = Vec::new();
        while let Some(item) = poll_fn(|cx| walk.as_mut().poll_next(cx)).await {
            results.push(item);
        }
        results
    }

    fn pdu_types(mock: &MockTransport) -> Vec<PduType> {
        mock.requests()
            .iter()
            .map(|r| r.pdu().unwrap().pdu_type)
            .collect()
    }

    #[tokio::test]
    async fn test_walk_stops_at_subtree_boundary() {
        let mock = mock();
        reply(&mock, &[(oid!(1, 3, 6, 1, 2, 1, 1, 1), Value::from("a"))]);
        reply(&mock, &[(oid!(1, 3, 6, 1, 2, 1, 1, 2), Value::from("b"))]);
        reply(&mock, &[(oid!(1, 3, 6, 1, 2, 1, 2, 1), Value::Integer(3))]);

        let mut walk = session(&mock).walk(system(), WalkOptions::default());
        let results = collect(&mut walk).await;

        let oids: Vec<Oid> = results.into_iter().map(|r| r.unwrap().oid).collect();
        assert_eq!(
            oids,
            vec![oid!(1, 3, 6, 1, 2, 1, 1, 1), oid!(1, 3, 6, 1, 2, 1, 1, 2)]
        );
        assert_eq!(walk.matches(), 2);
        assert_eq!(pdu_types(&mock), vec![PduType::GetNextRequest; 3]);

        // Each GETNEXT starts from the previous binding
        let cursors: Vec<Oid> = mock
            .requests()
            .iter()
            .map(|r| r.pdu().unwrap().varbinds[0].oid.clone())
            .collect();
        assert_eq!(
            cursors,
            vec![
                system(),
                oid!(1, 3, 6, 1, 2, 1, 1, 1),
                oid!(1, 3, 6, 1, 2, 1, 1, 2)
            ]
        );
    }

    #[tokio::test]
    async fn test_decreasing_oid_is_fatal() {
        let mock = mock();
        reply(&mock, &[(oid!(1, 3, 6, 1, 2, 1, 1, 3), Value::TimeTicks(1))]);
        reply(&mock, &[(oid!(1, 3, 6, 1, 2, 1, 1, 2), Value::from("x"))]);

        let mut walk = session(&mock).walk(system(), WalkOptions::default());
        let results = collect(&mut walk).await;

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        let err = results[1].as_ref().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::WalkIntegrity);
        assert_eq!(walk.matches(), 1);
    }

    #[tokio::test]
    async fn test_decreasing_oid_allowed_without_check() {
        let mock = mock();
        reply(&mock, &[(oid!(1, 3, 6, 1, 2, 1, 1, 3), Value::TimeTicks(1))]);
        reply(&mock, &[(oid!(1, 3, 6, 1, 2, 1, 1, 2), Value::from("x"))]);
        reply(&mock, &[(oid!(1, 3, 6, 1, 2, 1, 2), Value::Null)]);

        let options = WalkOptions {
            check_increase: false,
            ..WalkOptions::default()
        };
        let mut walk = session(&mock).walk(system(), options);
        let results = collect(&mut walk).await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.is_ok()));
    }

    #[tokio::test]
    async fn test_repeated_oid_stops_quietly() {
        let mock = mock();
        reply(&mock, &[(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("a"))]);
        reply(&mock, &[(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("a"))]);

        let mut walk = session(&mock).walk(system(), WalkOptions::default());
        let results = collect(&mut walk).await;
        assert_eq!(results.len(), 1);
        assert!(results[0].is_ok());
        assert_eq!(walk.matches(), 1);
    }

    #[tokio::test]
    async fn test_end_of_mib_view_stops() {
        let mock = mock();
        reply(&mock, &[(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("a"))]);
        reply(&mock, &[(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::EndOfMibView)]);

        let mut walk = session(&mock).walk(system(), WalkOptions::default());
        assert_eq!(collect(&mut walk).await.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_walk_falls_back_to_get() {
        let mock = mock();
        let root = oid!(1, 3, 6, 1, 2, 1, 1, 5, 0);
        reply(&mock, &[(oid!(1, 3, 6, 1, 2, 1, 1, 6, 0), Value::from("lab"))]);
        reply(&mock, &[(root.clone(), Value::from("gw1"))]);

        let mut walk = session(&mock).walk(root.clone(), WalkOptions::default());
        let results = collect(&mut walk).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].as_ref().unwrap().oid, root);
        assert_eq!(walk.matches(), 1);
        assert_eq!(
            pdu_types(&mock),
            vec![PduType::GetNextRequest, PduType::GetRequest]
        );
    }

    #[tokio::test]
    async fn test_fallback_disabled() {
        let mock = mock();
        reply(&mock, &[(oid!(1, 3, 6, 1, 2, 1, 2, 1, 0), Value::Integer(2))]);

        let options = WalkOptions {
            fallback_on_empty: false,
            ..WalkOptions::default()
        };
        let mut walk = session(&mock).walk(system(), options);
        assert!(collect(&mut walk).await.is_empty());
        assert_eq!(walk.matches(), 0);
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_include_start_emits_root_first() {
        let mock = mock();
        let root = oid!(1, 3, 6, 1, 2, 1, 2, 1);
        reply(&mock, &[(root.clone(), Value::NoSuchObject)]);
        reply(&mock, &[(oid!(1, 3, 6, 1, 2, 1, 2, 1, 0), Value::Integer(4))]);
        reply(&mock, &[(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 1, 1), Value::Integer(1))]);

        let options = WalkOptions {
            include_start: true,
            ..WalkOptions::default()
        };
        let mut walk = session(&mock).walk(root.clone(), options);
        let results = collect(&mut walk).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().value, Value::NoSuchObject);
        assert_eq!(walk.matches(), 2);
        assert_eq!(
            pdu_types(&mock),
            vec![
                PduType::GetRequest,
                PduType::GetNextRequest,
                PduType::GetNextRequest
            ]
        );
    }

    #[tokio::test]
    async fn test_end_bound_is_exclusive_of_emission() {
        let mock = mock();
        reply(&mock, &[(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("a"))]);
        reply(&mock, &[(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Value::TimeTicks(9))]);

        let options = WalkOptions {
            end: Some(oid!(1, 3, 6, 1, 2, 1, 1, 3)),
            ..WalkOptions::default()
        };
        let mut walk = session(&mock).walk(system(), options);
        let results = collect(&mut walk).await;
        assert_eq!(results.len(), 1);
        assert_eq!(walk.matches(), 1);
    }

    #[tokio::test]
    async fn test_bulk_batch_stops_mid_batch() {
        let mock = mock();
        reply(
            &mock,
            &[
                (oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("a")),
                (oid!(1, 3, 6, 1, 2, 1, 1, 2, 0), Value::from("b")),
                (oid!(1, 3, 6, 1, 2, 1, 2, 1, 0), Value::Integer(2)),
                (oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 1, 1), Value::Integer(1)),
            ],
        );

        let options = WalkOptions {
            bulk: Some(BulkParams {
                non_repeaters: 0,
                max_repetitions: 4,
            }),
            ..WalkOptions::default()
        };
        let mut walk = session(&mock).walk(system(), options);
        let results = collect(&mut walk).await;

        assert_eq!(results.len(), 2);
        assert_eq!(walk.matches(), 2);
        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        let pdu = requests[0].pdu().unwrap();
        assert_eq!(pdu.pdu_type, PduType::GetBulkRequest);
        assert_eq!(pdu.error_index, 4);
    }

    #[tokio::test]
    async fn test_bulk_continues_from_last_binding() {
        let mock = mock();
        reply(
            &mock,
            &[
                (oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("a")),
                (oid!(1, 3, 6, 1, 2, 1, 1, 2, 0), Value::from("b")),
            ],
        );
        reply(&mock, &[(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Value::EndOfMibView)]);

        let options = WalkOptions {
            bulk: Some(BulkParams::default()),
            ..WalkOptions::default()
        };
        let mut walk = session(&mock).walk(system(), options);
        assert_eq!(collect(&mut walk).await.len(), 2);

        let requests = mock.requests();
        assert_eq!(
            requests[1].pdu().unwrap().varbinds[0].oid,
            oid!(1, 3, 6, 1, 2, 1, 1, 2, 0)
        );
    }

    #[tokio::test]
    async fn test_empty_reply_ends_walk() {
        let mock = mock();
        reply(&mock, &[(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("a"))]);
        reply(&mock, &[]);

        let mut walk = session(&mock).walk(system(), WalkOptions::default());
        assert_eq!(collect(&mut walk).await.len(), 1);
        assert_eq!(mock.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_error_status_names_cursor() {
        let mock = mock();
        reply(&mock, &[(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("a"))]);
        mock.queue_response(
            ResponseBuilder::new(0)
                .error_status(5)
                .error_index(0)
                .build_v2c(b"public"),
        );

        let mut walk = session(&mock).walk(system(), WalkOptions::default());
        let results = collect(&mut walk).await;
        assert_eq!(results.len(), 2);
        match &results[1] {
            Err(Error::Snmp { oid, .. }) => {
                assert_eq!(oid.as_ref(), Some(&oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_ends_walk_with_transport_error() {
        let mock = mock();
        reply(&mock, &[(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("a"))]);

        let mut walk = session(&mock).walk(system(), WalkOptions::default());
        let results = collect(&mut walk).await;
        assert_eq!(results.len(), 2);
        assert_eq!(
            results[1].as_ref().unwrap_err().category(),
            ErrorCategory::Transport
        );
        assert_eq!(walk.matches(), 1);
    }
}
