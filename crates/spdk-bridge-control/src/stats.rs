//! Engine statistics queries shared by the resource kinds.

use spdk_bridge_core::{ResourceId, VolumeStats};
use spdk_bridge_rpc::methods::{self, BdevIostat, Iostat, IostatParams, NvmfStats};

use crate::context::BridgeContext;
use crate::error::{ControlError, Result};

/// Query NVMe-oF transport statistics.
///
/// The engine only reports poll group totals, so per-object counters are
/// unavailable once the call succeeds.
pub(crate) async fn nvmf_stats(ctx: &BridgeContext, id: &ResourceId) -> Result<VolumeStats> {
    let stats: NvmfStats = ctx.rpc.call_without_params(methods::NVMF_GET_STATS).await?;
    tracing::debug!(
        id = %id,
        tick_rate = stats.tick_rate,
        poll_groups = stats.poll_groups.len(),
        "Received NVMe-oF statistics"
    );
    Ok(VolumeStats::unavailable())
}

/// Query I/O counters of the block device backing a resource.
pub(crate) async fn volume_stats(ctx: &BridgeContext, volume_id: &ResourceId) -> Result<VolumeStats> {
    let params = IostatParams {
        name: volume_id.to_string(),
    };
    let iostat: Iostat = ctx.rpc.call(methods::BDEV_GET_IOSTAT, &params).await?;
    let [bdev] = <[BdevIostat; 1]>::try_from(iostat.bdevs).map_err(|bdevs| {
        ControlError::InvalidArgument(format!(
            "expecting exactly 1 result, got {}",
            bdevs.len()
        ))
    })?;
    tracing::debug!(volume_id = %volume_id, bdev = %bdev.name, "Received block device statistics");

    Ok(VolumeStats {
        read_bytes_count: bdev.bytes_read,
        read_ops_count: bdev.num_read_ops,
        write_bytes_count: bdev.bytes_written,
        write_ops_count: bdev.num_write_ops,
        unmap_bytes_count: bdev.bytes_unmapped,
        unmap_ops_count: bdev.num_unmap_ops,
        read_latency_ticks: bdev.read_latency_ticks,
        write_latency_ticks: bdev.write_latency_ticks,
    })
}
