use std::future::Future;
use tracing::{debug, warn};

/// 候補を優先順に試し、最初に開けたもので止める
///
/// `probe` が開けると答えた候補に `act` を実行する。どちらかが失敗した候補は
/// 飛ばして次へ進む。開けた候補があれば true。
pub async fn try_in_order<'a, P, PF, A, AF>(candidates: &[&'a str], mut probe: P, mut act: A) -> bool
where
    P: FnMut(&'a str) -> PF,
    PF: Future<Output = anyhow::Result<bool>>,
    A: FnMut(&'a str) -> AF,
    AF: Future<Output = anyhow::Result<()>>,
{
    for &candidate in candidates {
        match probe(candidate).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("開けません: {}", candidate);
                continue;
            }
            Err(e) => {
                warn!("確認に失敗 {}: {:#}", candidate, e);
                continue;
            }
        }

        match act(candidate).await {
            Ok(()) => {
                debug!("開きました: {}", candidate);
                return true;
            }
            Err(e) => warn!("起動に失敗 {}: {:#}", candidate, e),
        }
    }
    false
}
