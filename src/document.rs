//! Final document assembly.
//!
//! The body scaffold is load-bearing: the bundled navigation script scans
//! `.page-header` / heading markup and fills `#toc`, and scrollspy is wired
//! to the same ids. Keep the div/row/col structure intact when touching the
//! template.

/// The page template. `${...}` placeholders are substituted in
/// [`assemble`]; `${content}` is replaced last so user content is never
/// re-scanned for placeholders.
const PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>${title}</title>
    ${header}
    <style type="text/css" media="screen">
      body {font-family: 'Raleway', sans-serif}
    </style>
    <script>
        $(function() {
            var navSelector = '#toc';
            var $myNav = $(navSelector);
            Toc.init($myNav);
            $('body').scrollspy({
                target: navSelector
            });
        });
     </script>
  </head>
  <body data-spy="scroll" data-target="#toc">
    <div class="container" >
      <div  class="page-header">
        <h1 data-toc-skip>${title}</h1>
      </div>
      <div class="row">
         <div class="col-md-9">
            ${content}
         </div>
         <div class="col-md-3 hidden-print">
            <nav id="toc" data-spy="affix"></nav>
         </div>
      </div>
      <hr>
      <footer>Created with ${soft} (v${vers}) on ${time}</footer>
    </div>
  </body>
</html>
"##;

/// Wire title, resolved asset header, body fragment and metadata into the
/// final HTML document string.
pub fn assemble(title: &str, header: &str, content: &str, generated_at: &str) -> String {
  PAGE_TEMPLATE
    .replace("${title}", title)
    .replace("${header}", header)
    .replace("${soft}", env!("CARGO_PKG_NAME"))
    .replace("${vers}", env!("CARGO_PKG_VERSION"))
    .replace("${time}", generated_at)
    .replace("${content}", content)
}
