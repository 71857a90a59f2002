use super::VideoItem;

/// Merges per-channel results into the final video list.
///
/// Channels are concatenated in configuration order, sorted newest first by
/// `pub_date_raw` (plain string comparison, see [`VideoItem::pub_date_raw`])
/// and cut to `total_limit`. The sort is stable, so videos with equal
/// timestamps keep their configuration order.
pub fn aggregate(per_channel: Vec<Vec<VideoItem>>, total_limit: usize) -> Vec<VideoItem> {
    let mut videos: Vec<VideoItem> = per_channel.into_iter().flatten().collect();
    videos.sort_by(|a, b| b.pub_date_raw.cmp(&a.pub_date_raw));
    videos.truncate(total_limit);
    videos
}
