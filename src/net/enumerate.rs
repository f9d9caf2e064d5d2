//! Adaptive-buffer interface enumeration.
//!
//! The kernel's interface-list query answers into a caller-supplied
//! buffer and cannot say up front how large the answer is. The protocol
//! here grows a session-owned buffer by a fixed increment and retries
//! until the kernel's answer fits with room to spare; a completely full
//! buffer is ambiguous with truncation and always triggers one more
//! round.

use tracing::{debug, trace};

use crate::collection::GrowableCollection;
use crate::error::SysResult;
use crate::net::kernel::{NetKernel, OVERFLOW_ERRNO};
use crate::net::record;

/// Interface names added per collection growth, and enumeration records
/// added per buffer growth.
pub(crate) const IFLIST_CHUNK: usize = 20;

/// Session-scoped enumeration buffer.
///
/// Owned by the collector and reused across calls; its length is always
/// a multiple of the record size and only ever grows, amortizing
/// allocation cost across repeated enumerations.
#[derive(Debug, Default)]
pub struct IfconfBuffer {
    bytes: Vec<u8>,
}

impl IfconfBuffer {
    const INCREMENT: usize = record::RECORD_LEN * IFLIST_CHUNK;

    /// Current buffer length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` before the first growth.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn grow(&mut self) {
        self.bytes.resize(self.bytes.len() + Self::INCREMENT, 0);
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Returns the current interface names in kernel-reported order.
///
/// Records whose address-family tag differs from the kernel's list
/// family are skipped. Errors other than the overflow signal terminate
/// the call with no partial result.
pub(crate) fn interface_list<K: NetKernel>(
    kernel: &K,
    session: &mut IfconfBuffer,
) -> SysResult<GrowableCollection<String>> {
    let mut last_len = 0usize;

    let filled = loop {
        if session.is_empty() || last_len != 0 {
            session.grow();
        }
        let len = session.len();

        match kernel.interface_conf(&mut session.bytes) {
            Ok(filled) if filled < len => break filled,
            Ok(filled) => {
                // entirely full: the answer may be truncated
                trace!(len, "enumeration buffer filled exactly, retrying");
                last_len = filled;
            }
            Err(e) if e.errno() == Some(OVERFLOW_ERRNO) => {
                if last_len == len {
                    // overflow reported twice for one size: not a sizing
                    // problem
                    return Err(e);
                }
                trace!(len, "enumeration buffer overflow, retrying");
                last_len = len;
            }
            Err(e) => return Err(e),
        }
    };

    let mut names = GrowableCollection::with_chunk(IFLIST_CHUNK);
    let family = kernel.list_family();
    for rec in session.bytes()[..filled].chunks_exact(record::RECORD_LEN) {
        if record::family(rec) != family {
            continue;
        }
        names.push(record::name(rec));
    }

    debug!(
        interfaces = names.len(),
        buffer_len = session.len(),
        "interface enumeration complete"
    );
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SysError;
    use crate::net::mock::{MockKernel, OverflowMode};

    #[test]
    fn test_single_round_when_buffer_suffices() {
        let kernel = MockKernel::typical_host();
        let mut session = IfconfBuffer::default();

        let names = interface_list(&kernel, &mut session).unwrap();
        assert_eq!(names.as_slice(), ["lo", "eth0"]);
        assert_eq!(kernel.conf_calls(), 1);
    }

    #[test]
    fn test_truncating_kernel_forces_retries() {
        // 50 interfaces need three 20-record chunks
        let kernel = MockKernel::with_interface_count(50).overflow_mode(OverflowMode::Truncate);
        let mut session = IfconfBuffer::default();

        let names = interface_list(&kernel, &mut session).unwrap();
        assert_eq!(names.len(), 50);
        assert_eq!(names[0], "mock0");
        assert_eq!(names[49], "mock49");
        // 20 and 40 records truncate, 60 fit fully
        assert_eq!(kernel.conf_calls(), 3);
        assert_eq!(session.len(), record::RECORD_LEN * 60);
    }

    #[test]
    fn test_signalling_kernel_forces_retries() {
        let kernel = MockKernel::with_interface_count(30).overflow_mode(OverflowMode::Signal);
        let mut session = IfconfBuffer::default();

        let names = interface_list(&kernel, &mut session).unwrap();
        assert_eq!(names.len(), 30);
        assert_eq!(kernel.conf_calls(), 2);
    }

    #[test]
    fn test_exactly_full_buffer_is_never_accepted() {
        // 20 interfaces fill the first chunk exactly; a second round with
        // a larger buffer must follow
        let kernel = MockKernel::with_interface_count(20).overflow_mode(OverflowMode::Truncate);
        let mut session = IfconfBuffer::default();

        let names = interface_list(&kernel, &mut session).unwrap();
        assert_eq!(names.len(), 20);
        assert_eq!(kernel.conf_calls(), 2);
        assert!(names.len() * record::RECORD_LEN < session.len());
    }

    #[test]
    fn test_genuine_error_is_propagated_verbatim() {
        let kernel = MockKernel::typical_host().conf_error(13);
        let mut session = IfconfBuffer::default();

        let err = interface_list(&kernel, &mut session).unwrap_err();
        assert_eq!(err, SysError::Sys(13));
    }

    #[test]
    fn test_session_buffer_is_reused_and_never_shrinks() {
        let kernel = MockKernel::with_interface_count(50).overflow_mode(OverflowMode::Truncate);
        let mut session = IfconfBuffer::default();

        interface_list(&kernel, &mut session).unwrap();
        let grown = session.len();

        // a smaller answer afterwards leaves the buffer at its high-water
        // mark and needs no retries
        let kernel = MockKernel::typical_host();
        let names = interface_list(&kernel, &mut session).unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(session.len(), grown);
        assert_eq!(kernel.conf_calls(), 1);
    }

    #[test]
    fn test_foreign_family_records_are_skipped() {
        let kernel = MockKernel::typical_host().emit_link_records();
        let mut session = IfconfBuffer::default();

        let names = interface_list(&kernel, &mut session).unwrap();
        // link-layer twins of lo/eth0 are filtered out
        assert_eq!(names.as_slice(), ["lo", "eth0"]);
    }

    #[test]
    fn test_shrinking_answer_between_retries_is_complete_not_truncated() {
        // 30 interfaces overflow the first chunk; by the retry all but 5
        // are gone. The smaller answer fits with room to spare and is a
        // complete listing, not a truncation artifact.
        let kernel = MockKernel::with_interface_count(30)
            .overflow_mode(OverflowMode::Truncate)
            .shrink_after_first_call(5);
        let mut session = IfconfBuffer::default();

        let names = interface_list(&kernel, &mut session).unwrap();
        assert_eq!(names.len(), 5);
        assert_eq!(kernel.conf_calls(), 2);
    }

    #[test]
    fn test_buffer_length_is_record_multiple() {
        let kernel = MockKernel::with_interface_count(33).overflow_mode(OverflowMode::Truncate);
        let mut session = IfconfBuffer::default();
        interface_list(&kernel, &mut session).unwrap();
        assert_eq!(session.len() % record::RECORD_LEN, 0);
    }
}
