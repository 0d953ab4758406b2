//! Delay resolution shared by the canned-response and forward paths
//! (spec §4.5 "Compute delay. Sleep.").

use crate::model::Delay;

pub async fn sleep_for(delay: Option<Delay>) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay.as_duration()).await;
    }
}
